//! Pipeline entry points for scraper operations.
//!
//! - `FetchOrchestrator`: fetch + extract with bounded retry
//! - `ScrapePipeline`: one pass from page to snapshot
//! - `Scheduler`: repeated passes with jitter until stopped
//! - `run_mock`: offline snapshot with fixed data

pub mod acquire;
pub mod mock;
pub mod schedule;
pub mod scrape;

#[cfg(test)]
pub(crate) mod fixtures;

pub use acquire::FetchOrchestrator;
pub use mock::{mock_feeds, run_mock};
pub use schedule::{ScheduleReport, Scheduler, StopHandle, StopSignal, stop_channel};
pub use scrape::{RunSummary, ScrapePipeline};
