// src/config/sources.rs
//! Feed catalog. The shipped catalog is embedded from `config/sources.toml`;
//! `FEED_CATALOG_PATH` points at an override file with the same shape.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::model::Category;

pub const ENV_CATALOG_PATH: &str = "FEED_CATALOG_PATH";

static EMBEDDED: &str = include_str!("../../config/sources.toml");

static DEFAULT_CATALOG: Lazy<Vec<FeedSource>> =
    Lazy::new(|| parse_catalog(EMBEDDED).expect("valid embedded feed catalog"));

fn default_language() -> String {
    "en".to_string()
}
fn default_priority() -> u32 {
    1
}

/// One configured RSS/Atom feed.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedSource {
    pub name: String,
    pub url: String,
    pub category: Category,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_priority")]
    pub priority: u32,
}

#[derive(Debug, Deserialize)]
struct Catalog {
    #[serde(rename = "source")]
    sources: Vec<FeedSource>,
}

fn parse_catalog(s: &str) -> Result<Vec<FeedSource>> {
    let catalog: Catalog = toml::from_str(s).context("parsing feed catalog toml")?;
    Ok(catalog.sources)
}

pub fn load_from(path: &Path) -> Result<Vec<FeedSource>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading feed catalog from {}", path.display()))?;
    parse_catalog(&content)
}

/// Embedded catalog, unless `FEED_CATALOG_PATH` names an override.
pub fn load_default() -> Result<Vec<FeedSource>> {
    if let Ok(p) = std::env::var(ENV_CATALOG_PATH) {
        return load_from(Path::new(&p));
    }
    Ok(DEFAULT_CATALOG.clone())
}

/// Apply the collector's optional filters: a single category, and/or only
/// sources at or above a priority tier (lower number = higher priority).
pub fn filter(
    sources: Vec<FeedSource>,
    category: Option<Category>,
    max_priority: Option<u32>,
) -> Vec<FeedSource> {
    sources
        .into_iter()
        .filter(|s| category.map_or(true, |c| s.category == c))
        .filter(|s| max_priority.map_or(true, |p| s.priority <= p))
        .collect()
}
