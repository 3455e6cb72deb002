//! Local filesystem storage implementation.
//!
//! The snapshot is serialized into a temporary file created next to the
//! target (same directory, so the same filesystem), flushed to disk, and then
//! renamed over the target. A failure at any step before the rename removes
//! the temporary file and leaves the previous snapshot untouched.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::Snapshot;
use crate::storage::{SnapshotStorage, WriteMetadata};

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    path: PathBuf,
}

impl LocalStorage {
    /// Create a LocalStorage writing the snapshot to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Snapshot file location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, bytes: Vec<u8>) -> Result<()> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_atomic(&path, &bytes))
            .await
            .map_err(|e| AppError::persist(&self.path, e))?
    }

    /// Read bytes, returning None if the file doesn't exist.
    async fn read_bytes(&self) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }
}

/// Replace `path` with `bytes` through a same-directory temporary file.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    replace_with(path, |file| file.write_all(bytes))
}

/// Replace `path` with whatever `fill` writes into a fresh temporary file.
/// The target is only touched by the final rename.
fn replace_with<F>(path: &Path, fill: F) -> Result<()>
where
    F: FnOnce(&mut File) -> std::io::Result<()>,
{
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(|e| AppError::persist(path, e))?;

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "snapshot".to_string());

    // Dropping the handle on any early return deletes the temporary file.
    let mut tmp = tempfile::Builder::new()
        .prefix(&format!(".{stem}_"))
        .suffix(".tmp")
        .tempfile_in(parent)
        .map_err(|e| AppError::persist(path, e))?;

    fill(tmp.as_file_mut()).map_err(|e| AppError::persist(path, e))?;
    tmp.flush().map_err(|e| AppError::persist(path, e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| AppError::persist(path, e))?;

    tmp.persist(path)
        .map_err(|e| AppError::persist(path, e.error))?;
    Ok(())
}

#[async_trait]
impl SnapshotStorage for LocalStorage {
    async fn write_snapshot(&self, snapshot: &Snapshot) -> Result<WriteMetadata> {
        let bytes = serde_json::to_vec_pretty(snapshot)?;
        self.write_bytes(bytes).await?;

        log::info!(
            "Wrote {} feeds to {}",
            snapshot.feeds.len(),
            self.path.display()
        );

        Ok(WriteMetadata {
            feed_count: snapshot.feeds.len(),
            location: self.path.display().to_string(),
            timestamp: snapshot.updated_at,
        })
    }

    async fn load_snapshot(&self) -> Result<Option<Snapshot>> {
        match self.read_bytes().await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => {
                log::warn!("No snapshot found at {}", self.path.display());
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FeedRecord, RankedFeedRecord};
    use tempfile::TempDir;

    fn snapshot(counts: &[u64]) -> Snapshot {
        Snapshot::new(
            counts
                .iter()
                .enumerate()
                .map(|(i, &count)| RankedFeedRecord {
                    rank: i as u32 + 1,
                    feed: FeedRecord::new(
                        format!("feed_{i}"),
                        format!("Feed {i}"),
                        count,
                        "http://d.liveatc.net/{feed_id}",
                    ),
                })
                .collect(),
        )
    }

    fn dir_entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_write_creates_parent_and_round_trips() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("data/nested/top_feeds.json");
        let storage = LocalStorage::new(&path);

        let written = snapshot(&[30, 20, 10]);
        let meta = storage.write_snapshot(&written).await.unwrap();
        assert_eq!(meta.feed_count, 3);
        assert_eq!(meta.timestamp, written.updated_at);

        let loaded = storage.load_snapshot().await.unwrap().unwrap();
        assert_eq!(loaded, written);
        assert_eq!(dir_entries(path.parent().unwrap()), vec!["top_feeds.json"]);
    }

    #[tokio::test]
    async fn test_overwrite_replaces_whole_snapshot() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path().join("top_feeds.json"));

        storage.write_snapshot(&snapshot(&[5, 4, 3, 2, 1])).await.unwrap();
        let second = snapshot(&[9]);
        storage.write_snapshot(&second).await.unwrap();

        let loaded = storage.load_snapshot().await.unwrap().unwrap();
        assert_eq!(loaded, second);
        assert_eq!(loaded.feeds.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_replace_leaves_no_temp_file() {
        let tmp = TempDir::new().unwrap();
        // A directory squatting on the target path makes the final rename fail.
        let path = tmp.path().join("top_feeds.json");
        std::fs::create_dir(&path).unwrap();
        let storage = LocalStorage::new(&path);

        let result = storage.write_snapshot(&snapshot(&[1])).await;
        assert!(matches!(result, Err(AppError::Persist { .. })));
        assert!(path.is_dir());
        assert_eq!(dir_entries(tmp.path()), vec!["top_feeds.json"]);
    }

    #[tokio::test]
    async fn test_interrupted_write_keeps_prior_snapshot() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("top_feeds.json");
        let storage = LocalStorage::new(&path);

        let prior = snapshot(&[40, 30]);
        storage.write_snapshot(&prior).await.unwrap();
        let before = std::fs::read(&path).unwrap();

        // Half a document reaches the temp file before the disk gives out.
        let result = replace_with(&path, |file| {
            file.write_all(br#"{"updated_at":"#)?;
            Err(std::io::Error::other("no space left on device"))
        });

        assert!(matches!(result, Err(AppError::Persist { .. })));
        assert_eq!(std::fs::read(&path).unwrap(), before);
        let loaded = storage.load_snapshot().await.unwrap().unwrap();
        assert_eq!(loaded.updated_at, prior.updated_at);
        assert_eq!(loaded, prior);
        assert_eq!(dir_entries(tmp.path()), vec!["top_feeds.json"]);
    }

    #[tokio::test]
    async fn test_load_missing_snapshot() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path().join("absent.json"));
        assert!(storage.load_snapshot().await.unwrap().is_none());
    }
}
