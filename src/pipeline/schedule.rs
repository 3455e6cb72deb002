// src/pipeline/schedule.rs

//! Scheduled mode.
//!
//! The scheduler alternates between two states:
//!
//! ```text
//! Waiting ──(random jitter elapsed)──▶ Running
//! Running ──(pass finished)──▶ Waiting (fixed interval, then next jitter)
//! ```
//!
//! A stop request is honoured at every wait, including a pass's fetch and
//! retry backoff. Once a pass has its records the snapshot write always
//! finishes, and since that write is atomic, stopping never leaves partial
//! state behind.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::sync::watch;

use crate::error::AppError;
use crate::models::ScheduleConfig;
use crate::pipeline::ScrapePipeline;

/// Requests a scheduler stop.
#[derive(Debug, Clone)]
pub struct StopHandle(Arc<watch::Sender<bool>>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.send_replace(true);
    }
}

/// Observed by the scheduler at each wait.
#[derive(Debug, Clone)]
pub struct StopSignal(watch::Receiver<bool>);

impl StopSignal {
    /// A signal with no handle; it never fires.
    pub fn never() -> Self {
        let (_, rx) = watch::channel(false);
        Self(rx)
    }

    pub fn is_stopped(&self) -> bool {
        *self.0.borrow()
    }

    /// Sleep for `duration`. Returns `false` if a stop was requested before
    /// or during the wait.
    pub async fn sleep(&mut self, duration: Duration) -> bool {
        if self.is_stopped() {
            return false;
        }
        tokio::select! {
            _ = tokio::time::sleep(duration) => true,
            _ = self.stopped() => false,
        }
    }

    /// Resolves once a stop is requested.
    pub async fn stopped(&mut self) {
        // A dropped handle can no longer stop us.
        if self.0.wait_for(|stopped| *stopped).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Create a connected stop handle and signal.
pub fn stop_channel() -> (StopHandle, StopSignal) {
    let (tx, rx) = watch::channel(false);
    (StopHandle(Arc::new(tx)), StopSignal(rx))
}

/// Counters for a finished schedule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleReport {
    pub runs: usize,
    pub successes: usize,
    pub failures: usize,
}

/// Runs the pipeline repeatedly with jittered starts.
pub struct Scheduler {
    pipeline: ScrapePipeline,
    interval: Duration,
    max_jitter: Duration,
    max_runs: Option<usize>,
}

impl Scheduler {
    pub fn new(pipeline: ScrapePipeline, config: &ScheduleConfig) -> Self {
        Self {
            pipeline,
            interval: config.interval(),
            max_jitter: Duration::from_secs(config.max_jitter_secs),
            max_runs: None,
        }
    }

    /// Stop on its own after `runs` passes.
    pub fn with_max_runs(mut self, runs: usize) -> Self {
        self.max_runs = Some(runs);
        self
    }

    /// Loop until stopped (or until the run limit, if one is set).
    pub async fn run(&self, mut stop: StopSignal) -> ScheduleReport {
        log::info!(
            "Starting scheduler with {} minute interval",
            self.interval.as_secs() / 60
        );
        let mut report = ScheduleReport::default();

        loop {
            let jitter = self.jitter();
            log::info!("Adding {:.1}s jitter before scrape", jitter.as_secs_f64());
            if !stop.sleep(jitter).await {
                break;
            }

            report.runs += 1;
            match self.pipeline.run_until(&mut stop).await {
                Ok(summary) => {
                    report.successes += 1;
                    log::info!(
                        "Run {} complete: {} feeds written to {}",
                        report.runs,
                        summary.written.feed_count,
                        summary.written.location
                    );
                }
                Err(AppError::Stopped) => {
                    log::info!("Run {} abandoned on stop request", report.runs);
                    break;
                }
                Err(e) => {
                    report.failures += 1;
                    log::error!("Run {} failed: {}", report.runs, e);
                }
            }

            if self.max_runs.is_some_and(|max| report.runs >= max) {
                break;
            }

            log::info!("Sleeping for {} minutes", self.interval.as_secs() / 60);
            if !stop.sleep(self.interval).await {
                break;
            }
        }

        log::info!(
            "Scheduler stopped after {} runs ({} failed)",
            report.runs,
            report.failures
        );
        report
    }

    fn jitter(&self) -> Duration {
        if self.max_jitter.is_zero() {
            return Duration::ZERO;
        }
        let secs = rand::rng().random_range(0.0..=self.max_jitter.as_secs_f64());
        Duration::from_secs_f64(secs)
    }
}
