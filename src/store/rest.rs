// src/store/rest.rs
//! REST table-store client (PostgREST/Supabase dialect). Every public
//! operation runs a bounded retry: one reconnect, one more attempt, then
//! the error propagates. The delete+insert replace pairs retry as a unit so
//! a transient failure re-runs the whole pair instead of leaving the date
//! partition half-written.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{info, warn};

use super::{DailyItemRow, DigestStore, RawFetch, SentimentRow, FETCH_PAGE_SIZE, INSERT_CHUNK};
use crate::model::{RawItem, SelectedItem, SentimentSnapshot};

pub const ENV_STORE_URL: &str = "SUPABASE_URL";
pub const ENV_STORE_KEY: &str = "SUPABASE_KEY";

pub struct RestStore {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

fn build_http() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent("secintel-digest/0.1")
        .connect_timeout(Duration::from_secs(5))
        .timeout(Duration::from_secs(30))
        .build()
        .expect("reqwest client")
}

impl RestStore {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: build_http(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn from_env() -> Result<Self> {
        let url = std::env::var(ENV_STORE_URL)
            .map_err(|_| anyhow::anyhow!("Missing {ENV_STORE_URL} env var"))?;
        let key = std::env::var(ENV_STORE_KEY)
            .map_err(|_| anyhow::anyhow!("Missing {ENV_STORE_KEY} env var"))?;
        Ok(Self::new(url, key))
    }

    /// Drop and rebuild the HTTP client. Connection state is the only thing
    /// a reconnect can refresh here; the keys stay as constructed.
    pub fn reconnect(&mut self) {
        self.http = build_http();
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    async fn get_page<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let resp = self
            .authed(self.http.get(self.table_url(table)).query(query))
            .send()
            .await
            .with_context(|| format!("fetching {table}"))?;
        let status = resp.status();
        if !status.is_success() {
            bail!("store returned {status} fetching {table}");
        }
        resp.json().await.with_context(|| format!("decoding {table} rows"))
    }

    async fn insert_rows<T: Serialize>(&self, table: &str, rows: &[T]) -> Result<()> {
        let resp = self
            .authed(self.http.post(self.table_url(table)))
            .header("Prefer", "return=minimal")
            .json(rows)
            .send()
            .await
            .with_context(|| format!("inserting into {table}"))?;
        let status = resp.status();
        if !status.is_success() {
            bail!("store returned {status} inserting into {table}");
        }
        Ok(())
    }

    async fn delete_by_date(&self, table: &str, date: NaiveDate) -> Result<()> {
        let resp = self
            .authed(
                self.http
                    .delete(self.table_url(table))
                    .query(&[("date", format!("eq.{date}"))]),
            )
            .send()
            .await
            .with_context(|| format!("deleting {table} for {date}"))?;
        let status = resp.status();
        if !status.is_success() {
            bail!("store returned {status} deleting {table} for {date}");
        }
        Ok(())
    }

    async fn try_fetch_recent_raw(&self, cutoff: DateTime<Utc>, limit: usize) -> Result<RawFetch> {
        let mut fetch = RawFetch::default();
        let mut offset = 0usize;

        while fetch.items.len() < limit {
            let page: Vec<serde_json::Value> = self
                .get_page(
                    "raw_items",
                    &[
                        ("select", "*".to_string()),
                        ("collected_at", format!("gte.{}", cutoff.to_rfc3339())),
                        ("order", "collected_at.asc".to_string()),
                        ("limit", FETCH_PAGE_SIZE.to_string()),
                        ("offset", offset.to_string()),
                    ],
                )
                .await?;
            let page_len = page.len();

            for row in page {
                match serde_json::from_value::<RawItem>(row.clone()) {
                    Ok(item) => fetch.items.push(item),
                    Err(e) => {
                        // Typically a category outside the known set; skip
                        // the row, keep the run.
                        warn!(
                            category = row.get("category").and_then(|c| c.as_str()),
                            error = %e,
                            "skipping unreadable raw_items row"
                        );
                        fetch.unknown_category += 1;
                    }
                }
            }

            if page_len < FETCH_PAGE_SIZE {
                break;
            }
            offset += FETCH_PAGE_SIZE;
        }

        fetch.items.truncate(limit);
        Ok(fetch)
    }

    async fn try_insert_raw(&self, items: &[RawItem]) -> Result<usize> {
        for chunk in items.chunks(INSERT_CHUNK) {
            self.insert_rows("raw_items", chunk).await?;
        }
        Ok(items.len())
    }

    async fn try_replace_daily_items(
        &self,
        date: NaiveDate,
        rows: &[DailyItemRow],
    ) -> Result<()> {
        self.delete_by_date("daily_items", date).await?;
        if !rows.is_empty() {
            self.insert_rows("daily_items", rows).await?;
        }
        Ok(())
    }

    async fn try_replace_daily_sentiment(&self, row: &SentimentRow) -> Result<()> {
        self.delete_by_date("daily_sentiment", row.date).await?;
        self.insert_rows("daily_sentiment", std::slice::from_ref(row))
            .await?;
        Ok(())
    }
}

/// One reconnect, one more attempt, then give up. Replaces the original
/// retry-by-recursion with an explicit exit.
macro_rules! with_retry {
    ($self:ident, $what:literal, $call:expr) => {{
        let mut attempt = 0;
        loop {
            match $call {
                Ok(v) => break Ok(v),
                Err(e) if attempt == 0 => {
                    warn!(error = ?e, "store {} failed, reconnecting", $what);
                    $self.reconnect();
                    attempt += 1;
                }
                Err(e) => break Err(e),
            }
        }
    }};
}

#[async_trait]
impl DigestStore for RestStore {
    async fn fetch_recent_raw(
        &mut self,
        cutoff: DateTime<Utc>,
        limit: usize,
    ) -> Result<RawFetch> {
        with_retry!(self, "fetch", self.try_fetch_recent_raw(cutoff, limit).await)
    }

    async fn insert_raw(&mut self, items: &[RawItem]) -> Result<usize> {
        if items.is_empty() {
            return Ok(0);
        }
        let n = with_retry!(self, "insert", self.try_insert_raw(items).await)?;
        info!(count = n, "saved raw items");
        Ok(n)
    }

    async fn replace_daily_items(&mut self, date: NaiveDate, items: &[SelectedItem]) -> Result<()> {
        let rows: Vec<DailyItemRow> = items
            .iter()
            .map(|i| DailyItemRow::from_selected(date, i))
            .collect();
        with_retry!(
            self,
            "daily replace",
            self.try_replace_daily_items(date, &rows).await
        )
    }

    async fn replace_daily_sentiment(
        &mut self,
        date: NaiveDate,
        snapshot: &SentimentSnapshot,
    ) -> Result<()> {
        let row = SentimentRow::from_snapshot(date, snapshot);
        with_retry!(
            self,
            "sentiment replace",
            self.try_replace_daily_sentiment(&row).await
        )
    }
}
