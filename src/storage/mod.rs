//! Storage abstractions for snapshot persistence.
//!
//! A snapshot is a single JSON document that is always replaced whole:
//!
//! ```text
//! data/
//! └── top_feeds.json        # Latest ranked feeds, read by the web backend
//! ```
//!
//! Readers never observe a partially written file; see [`LocalStorage`].

pub mod local;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::Snapshot;

// Re-export for convenience
pub use local::LocalStorage;

/// Metadata about a snapshot write.
#[derive(Debug, Clone)]
pub struct WriteMetadata {
    /// Number of feeds written
    pub feed_count: usize,
    /// Where the snapshot now lives
    pub location: String,
    /// Timestamp recorded in the snapshot
    pub timestamp: DateTime<Utc>,
}

/// Trait for snapshot storage backends.
#[async_trait]
pub trait SnapshotStorage: Send + Sync {
    /// Replace the stored snapshot with `snapshot`, all or nothing.
    async fn write_snapshot(&self, snapshot: &Snapshot) -> Result<WriteMetadata>;

    /// Load the stored snapshot, if one exists.
    async fn load_snapshot(&self) -> Result<Option<Snapshot>>;
}
