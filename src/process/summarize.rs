// src/process/summarize.rs
//! Per-item summarization: translate probable non-English text first, ask
//! the oracle with the category's summary rubric, sanitize the reply. A
//! failed call falls back to the (possibly translated) title so the item
//! still ships.

use once_cell::sync::OnceCell;
use tracing::{info, warn};

use super::prompts;
use super::select::RankedItem;
use crate::model::{truncate_chars, SelectedItem};
use crate::oracle::{ModelTier, Oracle};

const TRANSLATION_MAX_TOKENS: u32 = 200;
const SUMMARY_MAX_TOKENS: u32 = 150;
const SUMMARY_EXCERPT_CHARS: usize = 1500;
const NON_ASCII_THRESHOLD: f64 = 0.3;

/// Share of characters outside ASCII; the crude but effective language
/// probe the pipeline runs before spending a translation call.
pub fn non_ascii_ratio(text: &str) -> f64 {
    let total = text.chars().count();
    if total == 0 {
        return 0.0;
    }
    let non_ascii = text.chars().filter(|c| !c.is_ascii()).count();
    non_ascii as f64 / total as f64
}

pub fn looks_non_english(text: &str) -> bool {
    non_ascii_ratio(text) > NON_ASCII_THRESHOLD
}

/// Translate when the probe fires; on any failure the original text comes
/// back unchanged.
pub async fn translate_if_needed(oracle: &dyn Oracle, text: &str) -> String {
    if text.is_empty() || !looks_non_english(text) {
        return text.to_string();
    }
    info!("translating non-English content");
    match oracle
        .complete(
            ModelTier::Fast,
            TRANSLATION_MAX_TOKENS,
            &prompts::translation_prompt(text),
        )
        .await
    {
        Ok(translated) => translated,
        Err(e) => {
            warn!(error = ?e, "translation failed, keeping original text");
            text.to_string()
        }
    }
}

/// Strip markdown emphasis and meta-commentary lines from an oracle reply,
/// then collapse whitespace.
pub fn clean_summary(text: &str) -> String {
    static RE_BOLD: OnceCell<regex::Regex> = OnceCell::new();
    static RE_ITALIC: OnceCell<regex::Regex> = OnceCell::new();
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_bold = RE_BOLD.get_or_init(|| regex::Regex::new(r"\*\*([^*]+)\*\*").unwrap());
    let re_italic = RE_ITALIC.get_or_init(|| regex::Regex::new(r"\*([^*]+)\*").unwrap());
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());

    let text = re_bold.replace_all(text, "$1");
    let text = re_italic.replace_all(&text, "$1");

    let kept: Vec<&str> = text
        .lines()
        .filter(|line| {
            let lower = line.to_lowercase();
            !lower.contains("recommendation:")
                && !lower.contains("skip this")
                && !lower.contains("not relevant")
        })
        .collect();

    re_ws.replace_all(&kept.join(" "), " ").trim().to_string()
}

/// Summarize every selected item, one oracle call each (plus up to two
/// translation calls), strictly in sequence.
pub async fn summarize_items(oracle: &dyn Oracle, items: Vec<RankedItem>) -> Vec<SelectedItem> {
    let total = items.len();
    info!(items = total, "summarizing selected items");

    let mut out = Vec::with_capacity(total);

    for (i, ranked) in items.into_iter().enumerate() {
        info!(
            item = i + 1,
            total,
            title = %truncate_chars(&ranked.scored.raw.title, 50),
            "summarizing"
        );

        let excerpt = truncate_chars(&ranked.scored.raw.content, SUMMARY_EXCERPT_CHARS);
        let content = translate_if_needed(oracle, &excerpt).await;
        let prompt = prompts::summary_prompt(&ranked.scored, &content);

        let summary = match oracle
            .complete(ModelTier::Deep, SUMMARY_MAX_TOKENS, &prompt)
            .await
        {
            Ok(reply) => {
                let cleaned = clean_summary(&reply);
                // The model sometimes answers in the source language; run
                // the probe once more on its output.
                translate_if_needed(oracle, &cleaned).await
            }
            Err(e) => {
                warn!(error = ?e, "summary call failed, falling back to title");
                translate_if_needed(oracle, &ranked.scored.raw.title).await
            }
        };

        out.push(SelectedItem {
            scored: ranked.scored,
            rank: ranked.rank,
            summary,
        });
    }

    out
}
