// src/services/extractor.rs

//! Feed record extraction.
//!
//! Turns the listing page markup into [`FeedRecord`]s. The page is not under
//! our control, so row recognition runs through ordered fallback chains:
//! link patterns first, then link keywords, then a list of id parameter names.
//! Rows that cannot be recognized are skipped, never reported as errors.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{Config, ExtractConfig, FeedRecord};
use crate::utils::{is_numeric, normalize_text, parse_count};

/// A compiled link pattern.
struct CompiledPattern {
    name: String,
    regex: Regex,
}

/// Extracts feed records from listing markup.
pub struct FeedExtractor {
    table_sel: Selector,
    row_sel: Selector,
    cell_sel: Selector,
    link_sel: Selector,
    patterns: Vec<CompiledPattern>,
    id_params: Vec<(String, Regex)>,
    keywords: Vec<String>,
    min_cells: usize,
    listener_column: usize,
    stream_url_template: String,
}

impl FeedExtractor {
    /// Compile the recognition rules.
    pub fn new(config: &ExtractConfig, stream_url_template: impl Into<String>) -> Result<Self> {
        let patterns = config
            .link_patterns
            .iter()
            .map(|p| {
                Ok(CompiledPattern {
                    name: p.name.clone(),
                    regex: Regex::new(&p.href_pattern)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let id_params = config
            .id_params
            .iter()
            .filter(|p| !p.trim().is_empty())
            .map(|p| {
                let regex = Regex::new(&format!(
                    r"(?:^|[?&;]){}=([^&#\s]+)",
                    regex::escape(p.trim())
                ))?;
                Ok((p.trim().to_string(), regex))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            table_sel: Self::parse_selector(&config.table_selector)?,
            row_sel: Self::parse_selector(&config.row_selector)?,
            cell_sel: Self::parse_selector(&config.cell_selector)?,
            link_sel: Self::parse_selector("a[href]")?,
            patterns,
            id_params,
            keywords: config
                .link_keywords
                .iter()
                .filter(|k| !k.trim().is_empty())
                .map(|k| k.to_lowercase())
                .collect(),
            min_cells: config.min_cells,
            listener_column: config.listener_column,
            stream_url_template: stream_url_template.into(),
        })
    }

    /// Build an extractor from the application configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.extract, config.source.stream_url_template.clone())
    }

    /// Extract every recognizable feed row, in page order.
    pub fn extract(&self, html: &str) -> Vec<FeedRecord> {
        let document = Html::parse_document(html);

        let rows: Vec<ElementRef> = match document.select(&self.table_sel).next() {
            Some(table) => {
                log::debug!("Found preferred listing table");
                table.select(&self.row_sel).collect()
            }
            None => {
                log::debug!("Preferred listing table not found, scanning all rows");
                document.select(&self.row_sel).collect()
            }
        };
        log::debug!("Scanning {} rows", rows.len());

        let records: Vec<FeedRecord> = rows
            .iter()
            .enumerate()
            .filter_map(|(index, row)| self.parse_row(index, row))
            .collect();

        log::info!("Extracted {} feeds from {} rows", records.len(), rows.len());
        records
    }

    fn parse_row(&self, index: usize, row: &ElementRef) -> Option<FeedRecord> {
        let cells: Vec<ElementRef> = row.select(&self.cell_sel).collect();
        if cells.len() < self.min_cells {
            return None;
        }

        let Some(link) = self.find_feed_link(index, row) else {
            log::debug!("Row {index}: no feed link");
            return None;
        };
        let href = link.value().attr("href").unwrap_or_default();

        let Some(feed_id) = self.extract_feed_id(href) else {
            log::debug!("Row {index}: no feed id in {href}");
            return None;
        };

        let name = Some(element_text(&link))
            .filter(|text| !text.is_empty())
            .or_else(|| {
                cells
                    .iter()
                    .map(element_text)
                    .find(|text| !text.is_empty() && !is_numeric(text))
            });
        let Some(name) = name else {
            log::debug!("Row {index}: no name for feed {feed_id}");
            return None;
        };

        let listener_text = cells
            .get(self.listener_column)
            .map(element_text)
            .unwrap_or_default();
        let listener_count = parse_count(&listener_text).unwrap_or_else(|| {
            log::debug!("Row {index}: listener cell '{listener_text}' is not a number, using 0");
            0
        });

        log::debug!("Row {index}: {name} ({feed_id}) with {listener_count} listeners");
        Some(FeedRecord::new(
            feed_id,
            name,
            listener_count,
            &self.stream_url_template,
        ))
    }

    /// First link matching a pattern (in pattern order), else the first link
    /// whose `href` contains a keyword.
    fn find_feed_link<'a>(&self, index: usize, row: &ElementRef<'a>) -> Option<ElementRef<'a>> {
        let links: Vec<ElementRef<'a>> = row.select(&self.link_sel).collect();

        let by_pattern = self.patterns.iter().find_map(|pattern| {
            links
                .iter()
                .find(|link| {
                    let href = link.value().attr("href").unwrap_or_default();
                    pattern.regex.is_match(href)
                })
                .map(|link| {
                    log::debug!("Row {index}: link matched pattern '{}'", pattern.name);
                    *link
                })
        });

        by_pattern.or_else(|| {
            links.iter().copied().find(|link| {
                let href = link.value().attr("href").unwrap_or_default().to_lowercase();
                let found = self.keywords.iter().any(|k| href.contains(k.as_str()));
                if found {
                    log::debug!("Row {index}: link matched by keyword: {href}");
                }
                found
            })
        })
    }

    /// Feed id from the first configured parameter present in `href`.
    fn extract_feed_id(&self, href: &str) -> Option<String> {
        self.id_params.iter().find_map(|(param, regex)| {
            regex.captures(href).and_then(|caps| caps.get(1)).map(|m| {
                log::trace!("Feed id '{}' taken from parameter '{param}'", m.as_str());
                m.as_str().to_string()
            })
        })
    }

    fn parse_selector(s: &str) -> Result<Selector> {
        Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
    }
}

fn element_text(element: &ElementRef) -> String {
    normalize_text(&element.text().collect::<String>())
}
