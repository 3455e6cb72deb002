// src/pipeline/scrape.rs

//! One full pipeline pass: acquire, rank, persist.

use std::sync::Arc;

use crate::error::Result;
use crate::models::{Config, Snapshot};
use crate::pipeline::{FetchOrchestrator, StopSignal};
use crate::services::{HttpPageFetcher, PageFetcher, rank_feeds};
use crate::storage::{SnapshotStorage, WriteMetadata};

/// Outcome of a successful pass.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Records extracted before ranking
    pub extracted: usize,
    /// The snapshot write
    pub written: WriteMetadata,
}

/// Fetches the listing, keeps the top feeds and replaces the snapshot.
pub struct ScrapePipeline {
    orchestrator: FetchOrchestrator,
    storage: Arc<dyn SnapshotStorage>,
    max_feeds: usize,
}

impl ScrapePipeline {
    pub fn new(
        config: &Config,
        fetcher: Arc<dyn PageFetcher>,
        storage: Arc<dyn SnapshotStorage>,
    ) -> Result<Self> {
        Ok(Self {
            orchestrator: FetchOrchestrator::new(config, fetcher)?,
            storage,
            max_feeds: config.output.max_feeds,
        })
    }

    /// Build a pipeline that fetches over HTTP.
    pub fn with_http(config: &Config, storage: Arc<dyn SnapshotStorage>) -> Result<Self> {
        let fetcher = Arc::new(HttpPageFetcher::new(&config.source)?);
        Self::new(config, fetcher, storage)
    }

    /// Run one pass. The stored snapshot is only touched when at least one
    /// feed was extracted.
    pub async fn run_once(&self) -> Result<RunSummary> {
        self.run_until(&mut StopSignal::never()).await
    }

    /// Run one pass that abandons acquisition when `stop` fires. Once records
    /// are in hand the snapshot write always completes.
    pub async fn run_until(&self, stop: &mut StopSignal) -> Result<RunSummary> {
        let records = self.orchestrator.acquire_until(stop).await?;
        let extracted = records.len();

        let ranked = rank_feeds(records, self.max_feeds);
        log::info!("Parsed {} top feeds", ranked.len());
        for entry in &ranked {
            log::info!(
                "  #{}: {} ({} listeners)",
                entry.rank,
                entry.feed.name,
                entry.feed.listener_count
            );
        }

        let snapshot = Snapshot::new(ranked);
        let written = self.storage.write_snapshot(&snapshot).await?;

        Ok(RunSummary { extracted, written })
    }
}
