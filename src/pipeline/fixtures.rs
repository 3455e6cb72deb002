//! Test doubles for the fetch and storage seams.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::Snapshot;
use crate::services::PageFetcher;
use crate::storage::{SnapshotStorage, WriteMetadata};

/// Replies with scripted pages in order; `None` is a transport failure.
/// The last reply repeats once the script runs out.
pub struct ScriptedFetcher {
    replies: Vec<Option<String>>,
    calls: AtomicUsize,
}

impl ScriptedFetcher {
    pub fn new(replies: Vec<Option<String>>) -> Self {
        Self {
            replies,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = self
            .replies
            .get(call)
            .or_else(|| self.replies.last())
            .cloned()
            .flatten();
        reply.ok_or_else(|| AppError::transport(url, "HTTP 503 Service Unavailable"))
    }
}

/// Keeps snapshots in memory.
#[derive(Default)]
pub struct MemoryStorage {
    snapshots: Mutex<Vec<Snapshot>>,
}

impl MemoryStorage {
    pub fn writes(&self) -> Vec<Snapshot> {
        self.snapshots.lock().unwrap().clone()
    }
}

#[async_trait]
impl SnapshotStorage for MemoryStorage {
    async fn write_snapshot(&self, snapshot: &Snapshot) -> Result<WriteMetadata> {
        self.snapshots.lock().unwrap().push(snapshot.clone());
        Ok(WriteMetadata {
            feed_count: snapshot.feeds.len(),
            location: "memory".to_string(),
            timestamp: snapshot.updated_at,
        })
    }

    async fn load_snapshot(&self) -> Result<Option<Snapshot>> {
        Ok(self.snapshots.lock().unwrap().last().cloned())
    }
}

/// A listing page with one row per count; feed `i` is `feed_{i}`.
pub fn listing(counts: &[u64]) -> String {
    let rows: String = counts
        .iter()
        .enumerate()
        .map(|(i, count)| {
            format!(
                r#"<tr><td>{}</td><td>{count}</td><td><a href="feedindex.php?feed=feed_{i}">Feed {i}</a></td></tr>"#,
                i + 1
            )
        })
        .collect();
    format!(
        r#"<html><body><table class="topTable">
           <tr><th>Rank</th><th>Listeners</th><th>Feed</th></tr>{rows}
           </table></body></html>"#
    )
}
