// src/pipeline/mock.rs

//! Synthetic snapshot for exercising downstream consumers offline.

use crate::error::Result;
use crate::models::{FeedRecord, RankedFeedRecord, Snapshot};
use crate::storage::{SnapshotStorage, WriteMetadata};

const MOCK_STREAM_URL_TEMPLATE: &str = "http://d.liveatc.net/{feed_id}";

const MOCK_FEEDS: [(&str, &str, u64); 5] = [
    ("kjfk_twr", "New York JFK Tower", 342),
    ("klax_twr", "Los Angeles LAX Tower", 287),
    ("kord_twr", "Chicago ORD Tower", 215),
    ("katl_app", "Atlanta ATL Approach", 198),
    ("kdfw_twr", "Dallas DFW Tower", 176),
];

/// The fixed five-feed top list. Stream URLs do not follow the configured
/// template, so the mock output is the same everywhere.
pub fn mock_feeds() -> Vec<RankedFeedRecord> {
    MOCK_FEEDS
        .iter()
        .zip(1u32..)
        .map(|(&(feed_id, name, listeners), rank)| RankedFeedRecord {
            rank,
            feed: FeedRecord::new(feed_id, name, listeners, MOCK_STREAM_URL_TEMPLATE),
        })
        .collect()
}

/// Write the mock snapshot without touching the network.
pub async fn run_mock(storage: &dyn SnapshotStorage) -> Result<WriteMetadata> {
    let snapshot = Snapshot::new(mock_feeds());
    let written = storage.write_snapshot(&snapshot).await?;
    log::info!("Created mock data for testing");
    Ok(written)
}
