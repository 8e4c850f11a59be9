// src/config/categories.rs
//! Category policy: dedup priority ordering, selection knobs, batch size,
//! freshness windows and sentiment bucketing markers. All of it is
//! configuration, not code — the defaults ship embedded, and
//! `CATEGORY_POLICY_PATH` points at an override file.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::model::Category;

pub const ENV_POLICY_PATH: &str = "CATEGORY_POLICY_PATH";

static EMBEDDED: &str = include_str!("../../config/categories.toml");

static DEFAULT_POLICY: Lazy<CategoryPolicy> =
    Lazy::new(|| CategoryPolicy::from_toml_str(EMBEDDED).expect("valid embedded category policy"));

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryPolicy {
    pub dedup: DedupPolicy,
    pub selection: SelectionPolicy,
    pub scoring: ScoringPolicy,
    pub freshness: FreshnessPolicy,
    pub sentiment: SentimentPolicy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DedupPolicy {
    /// Lower index = higher priority when collapsing duplicate titles.
    pub priority: Vec<Category>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelectionPolicy {
    pub score_threshold: i64,
    pub per_category: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringPolicy {
    pub batch_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FreshnessPolicy {
    pub default_hours: i64,
    /// Wider window used on the long-weekend day (Sunday), so Friday and
    /// Saturday items still count as fresh.
    pub long_weekend_hours: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SentimentPolicy {
    /// Source-name substrings that route a headline into the adversary bucket.
    pub adversary_source_markers: Vec<String>,
    pub sample_size: usize,
    pub west_headline_cap: usize,
    pub adversary_headline_cap: usize,
}

impl CategoryPolicy {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("parsing category policy toml")
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading category policy from {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Embedded defaults, unless `CATEGORY_POLICY_PATH` names an override.
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_POLICY_PATH) {
            return Self::load_from(Path::new(&p));
        }
        Ok(DEFAULT_POLICY.clone())
    }

    /// Numeric dedup rank; categories missing from the configured ordering
    /// sort last.
    pub fn priority_rank(&self, category: Category) -> usize {
        self.dedup
            .priority
            .iter()
            .position(|&c| c == category)
            .unwrap_or(99)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_policy_parses_and_orders_all_categories() {
        let policy = CategoryPolicy::from_toml_str(EMBEDDED).unwrap();
        assert_eq!(policy.dedup.priority.len(), Category::ALL.len());
        assert_eq!(policy.priority_rank(Category::CyberAttacks), 0);
        assert_eq!(policy.priority_rank(Category::TargetJapan), 13);
        assert!(
            policy.priority_rank(Category::CyberAttacks)
                < policy.priority_rank(Category::Geopolitics)
        );
    }

    #[test]
    fn embedded_knobs_match_pipeline_contract() {
        let policy = CategoryPolicy::from_toml_str(EMBEDDED).unwrap();
        assert_eq!(policy.selection.score_threshold, 70);
        assert_eq!(policy.selection.per_category, 5);
        assert_eq!(policy.scoring.batch_size, 10);
        assert_eq!(policy.freshness.default_hours, 24);
        assert_eq!(policy.freshness.long_weekend_hours, 72);
    }
}
