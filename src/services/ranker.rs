// src/services/ranker.rs

//! Top-N ranking of extracted feeds.

use crate::models::{FeedRecord, RankedFeedRecord};

/// Rank feeds by listener count, highest first, keeping at most `limit`.
///
/// The sort is stable, so feeds with equal counts keep their extraction
/// order. Ranks are dense and start at 1.
pub fn rank_feeds(mut records: Vec<FeedRecord>, limit: usize) -> Vec<RankedFeedRecord> {
    records.sort_by(|a, b| b.listener_count.cmp(&a.listener_count));
    records.truncate(limit);

    records
        .into_iter()
        .zip(1u32..)
        .map(|(feed, rank)| RankedFeedRecord { rank, feed })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feeds(counts: &[u64]) -> Vec<FeedRecord> {
        counts
            .iter()
            .enumerate()
            .map(|(i, &count)| {
                FeedRecord::new(
                    format!("feed_{i}"),
                    format!("Feed {i}"),
                    count,
                    "http://d.liveatc.net/{feed_id}",
                )
            })
            .collect()
    }

    #[test]
    fn test_top_five_with_stable_ties() {
        let ranked = rank_feeds(feeds(&[50, 200, 10, 300, 300, 5, 90]), 5);

        let counts: Vec<u64> = ranked.iter().map(|r| r.feed.listener_count).collect();
        assert_eq!(counts, vec![300, 300, 200, 90, 50]);

        let ids: Vec<&str> = ranked.iter().map(|r| r.feed.feed_id.as_str()).collect();
        assert_eq!(ids, vec!["feed_3", "feed_4", "feed_1", "feed_6", "feed_0"]);

        let ranks: Vec<u32> = ranked.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_fewer_than_limit() {
        let ranked = rank_feeds(feeds(&[1, 3]), 5);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].feed.listener_count, 3);
        assert_eq!(ranked[1].rank, 2);
    }

    #[test]
    fn test_empty_input() {
        assert!(rank_feeds(Vec::new(), 5).is_empty());
    }

    #[test]
    fn test_ranking_is_idempotent() {
        let input = feeds(&[7, 7, 0, 42, 7, 1]);
        assert_eq!(rank_feeds(input.clone(), 5), rank_feeds(input, 5));
    }

    #[test]
    fn test_counts_non_increasing() {
        let ranked = rank_feeds(feeds(&[4, 8, 15, 16, 23, 42, 0, 0]), 5);
        assert!(
            ranked
                .windows(2)
                .all(|w| w[0].feed.listener_count >= w[1].feed.listener_count)
        );
    }
}
