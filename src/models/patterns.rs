// src/models/patterns.rs

//! Link recognition patterns for feed rows.

use serde::{Deserialize, Serialize};

/// A named regular expression matched against a link's `href`.
///
/// Patterns are tried in list order; the first one that matches any link in
/// a row identifies that row's feed link.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LinkPattern {
    /// Pattern name for identification in logs
    pub name: String,

    /// Regular expression applied to the `href` attribute
    pub href_pattern: String,
}

impl LinkPattern {
    pub fn new(name: impl Into<String>, href_pattern: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            href_pattern: href_pattern.into(),
        }
    }
}
