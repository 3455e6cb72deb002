// src/pipeline/acquire.rs

//! Page acquisition with bounded retry.

use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::{Config, FeedRecord, RetryConfig};
use crate::pipeline::StopSignal;
use crate::services::{FeedExtractor, PageFetcher, looks_like_challenge};

/// Drives the page fetcher until it yields at least one feed record.
///
/// Transport failures and pages with no recognizable rows both count as a
/// failed attempt. After attempt `n` fails the orchestrator waits
/// `n * retry.delay_secs` before trying again.
pub struct FetchOrchestrator {
    fetcher: Arc<dyn PageFetcher>,
    extractor: FeedExtractor,
    page_url: String,
    retry: RetryConfig,
    dump_html: Option<PathBuf>,
}

impl FetchOrchestrator {
    pub fn new(config: &Config, fetcher: Arc<dyn PageFetcher>) -> Result<Self> {
        Ok(Self {
            fetcher,
            extractor: FeedExtractor::from_config(config)?,
            page_url: config.source.page_url.clone(),
            retry: config.retry.clone(),
            dump_html: config.output.dump_html.clone(),
        })
    }

    /// Fetch and extract feed records, retrying up to the attempt budget.
    pub async fn acquire(&self) -> Result<Vec<FeedRecord>> {
        self.acquire_until(&mut StopSignal::never()).await
    }

    /// Like [`acquire`](Self::acquire), but gives up with
    /// [`AppError::Stopped`] as soon as `stop` fires, whether a fetch or a
    /// backoff wait is in progress.
    pub async fn acquire_until(&self, stop: &mut StopSignal) -> Result<Vec<FeedRecord>> {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            if stop.is_stopped() {
                return Err(AppError::Stopped);
            }
            let outcome = tokio::select! {
                outcome = self.attempt() => outcome,
                _ = stop.stopped() => return Err(AppError::Stopped),
            };
            let error = match outcome {
                Ok(records) => return Ok(records),
                Err(e) => e,
            };
            log::error!("Attempt {attempt}/{max_attempts} failed: {error}");

            if !error.is_retryable() {
                return Err(error);
            }
            if attempt >= max_attempts {
                log::error!("All retry attempts failed");
                return Err(AppError::RetriesExhausted {
                    attempts: max_attempts,
                    last: Box::new(error),
                });
            }

            let delay = self.retry.backoff(attempt);
            log::info!("Retrying in {} seconds...", delay.as_secs());
            if !stop.sleep(delay).await {
                log::info!("Stop requested during backoff");
                return Err(AppError::Stopped);
            }
            attempt += 1;
        }
    }

    async fn attempt(&self) -> Result<Vec<FeedRecord>> {
        let markup = self.fetcher.fetch(&self.page_url).await?;
        self.dump_markup(&markup).await;

        let records = self.extractor.extract(&markup);
        if records.is_empty() {
            if looks_like_challenge(&markup) {
                log::warn!(
                    "Page looks like a challenge or interstitial ({} bytes)",
                    markup.len()
                );
            } else {
                log::warn!("No feeds parsed from page");
            }
            return Err(AppError::empty_extraction(&self.page_url, markup.len()));
        }
        Ok(records)
    }

    /// Save the fetched markup for inspection, if configured.
    async fn dump_markup(&self, markup: &str) {
        let Some(path) = &self.dump_html else {
            return;
        };
        match tokio::fs::write(path, markup).await {
            Ok(()) => log::info!("Saved page markup to {}", path.display()),
            Err(e) => log::warn!("Could not save page markup to {}: {}", path.display(), e),
        }
    }
}
