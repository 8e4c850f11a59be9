// src/process/mod.rs
//! Processing pipeline: Load → Sentiment → Score → Dedup → Select →
//! Summarize → Persist. Linear, no branching back; an empty selection
//! short-circuits to Done and still counts as a successful run.

pub mod dedup;
pub mod freshness;
pub mod prompts;
pub mod scoring;
pub mod select;
pub mod sentiment;
pub mod summarize;

use anyhow::{Context, Result};
use chrono::{Datelike, Duration, Utc};
use tracing::info;

use crate::config::categories::CategoryPolicy;
use crate::model::SentimentSnapshot;
use crate::oracle::Oracle;
use crate::store::{DigestStore, RAW_FETCH_LIMIT, RAW_RETENTION_DAYS};

/// Per-stage counts for one run; the final user-visible summary.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    pub loaded: usize,
    pub fresh: usize,
    pub unknown_category_dropped: usize,
    pub scored: usize,
    pub duplicates_removed: usize,
    pub selected: usize,
    pub summarized: usize,
    pub persisted: usize,
    pub sentiment: Option<SentimentSnapshot>,
}

/// Run the full pipeline once against the given store and oracle. Oracle
/// and parse failures degrade locally; only load and persist failures
/// propagate.
pub async fn run_pipeline<S: DigestStore + ?Sized>(
    store: &mut S,
    oracle: &dyn Oracle,
    policy: &CategoryPolicy,
) -> Result<PipelineReport> {
    let now = Utc::now();
    let window = freshness::window_hours(&policy.freshness, now.weekday());
    info!(
        day = %now.format("%A"),
        fresh_window_hours = window,
        "starting processing pipeline"
    );

    let mut report = PipelineReport::default();

    // Load
    let cutoff = now - Duration::days(RAW_RETENTION_DAYS);
    let fetch = store
        .fetch_recent_raw(cutoff, RAW_FETCH_LIMIT)
        .await
        .context("loading raw items")?;
    report.unknown_category_dropped = fetch.unknown_category;
    report.loaded = fetch.items.len();

    let items = freshness::tag_freshness(fetch.items, now, &policy.freshness);
    report.fresh = items.iter().filter(|i| i.is_fresh).count();
    info!(
        loaded = report.loaded,
        fresh = report.fresh,
        old = report.loaded - report.fresh,
        dropped = report.unknown_category_dropped,
        "loaded raw items"
    );

    if items.is_empty() {
        info!("no items to process");
        return Ok(report);
    }

    // Sentiment
    let snapshot = sentiment::synthesize(oracle, &items, &policy.sentiment).await;
    report.sentiment = Some(snapshot.clone());

    // Score
    let scored = scoring::score_items(oracle, policy, items).await;
    report.scored = scored.len();

    // Dedup
    let (unique, removed) = dedup::dedup_items(scored, policy);
    report.duplicates_removed = removed;

    // Select
    let ranked = select::select_top(unique, policy);
    report.selected = ranked.len();

    if ranked.is_empty() {
        info!("no items passed filtering");
        return Ok(report);
    }

    // Summarize
    let selected = summarize::summarize_items(oracle, ranked).await;
    report.summarized = selected.len();

    // Persist (fatal on failure: a half-written date partition would break
    // the replace invariant)
    let date = now.date_naive();
    store
        .replace_daily_items(date, &selected)
        .await
        .context("persisting daily items")?;
    store
        .replace_daily_sentiment(date, &snapshot)
        .await
        .context("persisting daily sentiment")?;
    report.persisted = selected.len();

    info!(
        selected = report.selected,
        persisted = report.persisted,
        duplicates_removed = report.duplicates_removed,
        "pipeline complete"
    );
    Ok(report)
}
