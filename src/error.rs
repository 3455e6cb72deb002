// src/error.rs

//! Unified error handling for the top feeds scraper.

use std::fmt;
use std::path::Path;

use thiserror::Error;

/// Result type alias for scraper operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Link pattern failed to compile
    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// The page could not be retrieved, or came back with a non-success status
    #[error("Transport error for {url}: {message}")]
    Transport { url: String, message: String },

    /// The page was retrieved but no feed rows could be parsed from it
    #[error("No feeds extracted from {url} ({markup_len} bytes of markup)")]
    EmptyExtraction { url: String, markup_len: usize },

    /// Every attempt within a run failed
    #[error("All {attempts} attempts failed; last error: {last}")]
    RetriesExhausted { attempts: u32, last: Box<AppError> },

    /// A stop was requested before the pass had any records
    #[error("Stopped before the run completed")]
    Stopped,

    /// The snapshot could not be written or moved into place
    #[error("Failed to persist snapshot to {path}: {message}")]
    Persist { path: String, message: String },
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a transport error for the given URL.
    pub fn transport(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Transport {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create an empty-extraction error.
    pub fn empty_extraction(url: impl Into<String>, markup_len: usize) -> Self {
        Self::EmptyExtraction {
            url: url.into(),
            markup_len,
        }
    }

    /// Create a persistence error for the given target path.
    pub fn persist(path: &Path, message: impl fmt::Display) -> Self {
        Self::Persist {
            path: path.display().to_string(),
            message: message.to_string(),
        }
    }

    /// Whether a fetch attempt that failed with this error may be retried
    /// within the same run.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::EmptyExtraction { .. } | Self::Http(_)
        )
    }
}
