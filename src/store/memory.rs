// src/store/memory.rs
//! In-memory `DigestStore` used by tests and local dry runs. Mirrors the
//! REST store's replace-by-date semantics exactly.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use super::{DailyItemRow, DigestStore, RawFetch, SentimentRow};
use crate::model::{RawItem, SelectedItem, SentimentSnapshot};

#[derive(Default)]
pub struct MemoryStore {
    pub raw_items: Vec<RawItem>,
    pub daily_items: HashMap<NaiveDate, Vec<DailyItemRow>>,
    pub daily_sentiment: HashMap<NaiveDate, SentimentRow>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_raw_items(items: Vec<RawItem>) -> Self {
        Self {
            raw_items: items,
            ..Self::default()
        }
    }
}

#[async_trait]
impl DigestStore for MemoryStore {
    async fn fetch_recent_raw(
        &mut self,
        cutoff: DateTime<Utc>,
        limit: usize,
    ) -> Result<RawFetch> {
        let mut items: Vec<RawItem> = self
            .raw_items
            .iter()
            .filter(|i| i.collected_at >= cutoff)
            .cloned()
            .collect();
        items.truncate(limit);
        Ok(RawFetch {
            items,
            unknown_category: 0,
        })
    }

    async fn insert_raw(&mut self, items: &[RawItem]) -> Result<usize> {
        self.raw_items.extend_from_slice(items);
        Ok(items.len())
    }

    async fn replace_daily_items(&mut self, date: NaiveDate, items: &[SelectedItem]) -> Result<()> {
        let rows = items
            .iter()
            .map(|i| DailyItemRow::from_selected(date, i))
            .collect();
        self.daily_items.insert(date, rows);
        Ok(())
    }

    async fn replace_daily_sentiment(
        &mut self,
        date: NaiveDate,
        snapshot: &SentimentSnapshot,
    ) -> Result<()> {
        self.daily_sentiment
            .insert(date, SentimentRow::from_snapshot(date, snapshot));
        Ok(())
    }
}
