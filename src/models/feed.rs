//! Feed records and the persisted snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder substituted by the feed identifier in a stream URL template.
pub const FEED_ID_PLACEHOLDER: &str = "{feed_id}";

/// One feed row extracted from the listing page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedRecord {
    /// Stable feed identifier (e.g. `kjfk_twr`)
    pub feed_id: String,

    /// Display name
    pub name: String,

    /// Current listener count (0 when the page did not give a number)
    #[serde(rename = "listeners")]
    pub listener_count: u64,

    /// Audio stream URL derived from the feed identifier
    pub stream_url: String,
}

impl FeedRecord {
    /// Build a record, deriving `stream_url` from `template`.
    pub fn new(
        feed_id: impl Into<String>,
        name: impl Into<String>,
        listener_count: u64,
        template: &str,
    ) -> Self {
        let feed_id = feed_id.into();
        let stream_url = stream_url(template, &feed_id);
        Self {
            feed_id,
            name: name.into(),
            listener_count,
            stream_url,
        }
    }
}

/// Substitute a feed identifier into a stream URL template.
pub fn stream_url(template: &str, feed_id: &str) -> String {
    template.replace(FEED_ID_PLACEHOLDER, feed_id)
}

/// A feed record with its position in the top list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RankedFeedRecord {
    /// 1-based rank
    pub rank: u32,

    #[serde(flatten)]
    pub feed: FeedRecord,
}

/// The persisted top feeds document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Snapshot {
    /// Time the snapshot was produced
    pub updated_at: DateTime<Utc>,

    /// Ranked feeds, best first
    pub feeds: Vec<RankedFeedRecord>,
}

impl Snapshot {
    /// Stamp a ranked list with the current time.
    pub fn new(feeds: Vec<RankedFeedRecord>) -> Self {
        Self {
            updated_at: Utc::now(),
            feeds,
        }
    }
}
