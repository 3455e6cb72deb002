// src/lib.rs

//! LiveATC Top Feeds Scraper Library

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
