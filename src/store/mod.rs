// src/store/mod.rs
//! Durable store boundary. The pipeline talks to a `DigestStore` trait
//! object it was handed for the lifetime of one run; the REST implementation
//! targets a PostgREST-style table store, the in-memory one backs tests.
//!
//! Write semantics for the daily tables are replace-by-date: delete the
//! date partition, then insert. Re-running the same day overwrites instead
//! of accumulating.

pub mod memory;
pub mod rest;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{RawItem, SelectedItem, SentimentSnapshot};

pub use memory::MemoryStore;
pub use rest::RestStore;

/// Raw-item fetch window and paging, matching the collector's retention.
pub const RAW_RETENTION_DAYS: i64 = 7;
pub const RAW_FETCH_LIMIT: usize = 2500;
pub const FETCH_PAGE_SIZE: usize = 1000;
pub const INSERT_CHUNK: usize = 100;

/// Result of a raw fetch: typed items plus the count of rows dropped for
/// carrying an out-of-set category (or an otherwise unreadable shape).
#[derive(Debug, Default)]
pub struct RawFetch {
    pub items: Vec<RawItem>,
    pub unknown_category: usize,
}

#[async_trait]
pub trait DigestStore: Send + Sync {
    /// Raw items with `collected_at >= cutoff`, up to `limit`, fetched in
    /// pages of [`FETCH_PAGE_SIZE`]. Rows with an unrecognized category are
    /// dropped and counted, never an error.
    async fn fetch_recent_raw(&mut self, cutoff: DateTime<Utc>, limit: usize)
        -> Result<RawFetch>;

    /// Insert collected items in chunks of [`INSERT_CHUNK`]. Returns the
    /// number written.
    async fn insert_raw(&mut self, items: &[RawItem]) -> Result<usize>;

    /// Replace the day's digest: delete the date partition, insert the
    /// selected set. Failure is fatal for the run.
    async fn replace_daily_items(&mut self, date: NaiveDate, items: &[SelectedItem]) -> Result<()>;

    /// Replace the day's sentiment snapshot.
    async fn replace_daily_sentiment(
        &mut self,
        date: NaiveDate,
        snapshot: &SentimentSnapshot,
    ) -> Result<()>;
}

/// Row shape of the `daily_items` table, keyed by (date, category, rank).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyItemRow {
    pub date: NaiveDate,
    pub category: String,
    pub rank: u32,
    pub headline: String,
    pub summary: String,
    pub source_name: String,
    pub source_url: String,
    pub source_type: String,
    pub is_fresh: bool,
    pub involves_key_theft: bool,
    pub key_theft_type: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

impl DailyItemRow {
    pub fn from_selected(date: NaiveDate, item: &SelectedItem) -> Self {
        let raw = &item.scored.raw;
        Self {
            date,
            category: raw.category.as_str().to_string(),
            rank: item.rank,
            headline: raw.title.clone(),
            summary: item.summary.clone(),
            source_name: raw.source_name.clone(),
            source_url: raw.url.clone(),
            source_type: raw.source_type.as_str().to_string(),
            is_fresh: item.scored.is_fresh,
            involves_key_theft: item.scored.involves_key_theft,
            key_theft_type: item.scored.key_theft_type.map(|k| k.as_str().to_string()),
            published_at: raw.published_at,
        }
    }
}

/// Row shape of the `daily_sentiment` table, keyed by date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentRow {
    pub date: NaiveDate,
    pub west_sentiment: String,
    pub west_explanation: String,
    pub adversary_sentiment: String,
    pub adversary_explanation: String,
}

impl SentimentRow {
    pub fn from_snapshot(date: NaiveDate, s: &SentimentSnapshot) -> Self {
        Self {
            date,
            west_sentiment: s.west_sentiment.as_str().to_string(),
            west_explanation: s.west_explanation.clone(),
            adversary_sentiment: s.adversary_sentiment.as_str().to_string(),
            adversary_explanation: s.adversary_explanation.clone(),
        }
    }
}
