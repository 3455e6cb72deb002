//! Service layer for the top feeds scraper.
//!
//! This module contains the business logic for:
//! - Page fetching (`PageFetcher`, `HttpPageFetcher`)
//! - Feed row extraction (`FeedExtractor`)
//! - Top-N ranking (`rank_feeds`)

mod extractor;
mod fetcher;
mod ranker;

pub use extractor::FeedExtractor;
pub use fetcher::{HttpPageFetcher, PageFetcher, looks_like_challenge};
pub use ranker::rank_feeds;
