// src/services/fetcher.rs

//! Page fetching.
//!
//! The pipeline only needs raw markup, so the transport sits behind the
//! [`PageFetcher`] trait. [`HttpPageFetcher`] is the production transport.

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::SourceConfig;
use crate::utils::http;

/// Pages smaller than this are unlikely to carry a real listing.
const MIN_EXPECTED_MARKUP: usize = 1000;

/// Markers of an anti-bot interstitial.
const CHALLENGE_MARKERS: &[&str] = &[
    "challenge",
    "cloudflare",
    "just a moment",
    "cf-browser-verification",
];

/// Source of raw listing markup.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the page and return its body, or fail with a transport error.
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Fetches pages over HTTP with a browser-like request profile.
pub struct HttpPageFetcher {
    client: Client,
}

impl HttpPageFetcher {
    /// Create a fetcher from the source settings.
    pub fn new(config: &SourceConfig) -> Result<Self> {
        Ok(Self {
            client: http::create_client(config)?,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        log::info!("Fetching top feeds from {url}");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::transport(url, e))?;

        let status = response.status();
        log::info!("Response status: {status}");
        if !status.is_success() {
            return Err(AppError::transport(url, format!("HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::transport(url, e))?;
        log::info!("Fetched {} bytes", body.len());
        Ok(body)
    }
}

/// Heuristic check for a challenge or otherwise truncated page.
pub fn looks_like_challenge(markup: &str) -> bool {
    if markup.len() < MIN_EXPECTED_MARKUP {
        return true;
    }
    let lower = markup.to_lowercase();
    CHALLENGE_MARKERS.iter().any(|marker| lower.contains(marker))
}
