// src/models/mod.rs

//! Domain models for the top feeds scraper.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod feed;
mod patterns;

// Re-export all public types
pub use config::{
    Config, ExtractConfig, OutputConfig, RetryConfig, ScheduleConfig, SourceConfig,
};
pub use feed::{FEED_ID_PLACEHOLDER, FeedRecord, RankedFeedRecord, Snapshot, stream_url};
pub use patterns::LinkPattern;
