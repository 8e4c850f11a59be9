// src/process/scoring.rs
//! Category batcher + scoring oracle adapter. Items are grouped by
//! category, sent to the oracle in fixed-size batches, and every input item
//! comes back as exactly one `ScoredItem` — a failed call or a partial
//! response degrades the uncovered items to the neutral default instead of
//! dropping them.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::{info, warn};

use super::prompts;
use crate::config::categories::CategoryPolicy;
use crate::model::{
    truncate_chars, Adversary, Category, FreshItem, KeyTheftType, ScoredItem, DEGRADED_SCORE,
};
use crate::oracle::{ModelTier, Oracle};

const SCORING_MAX_TOKENS: u32 = 1000;
const EXCERPT_CHARS: usize = 300;

/// One entry of the oracle's JSON array. Either score key is accepted;
/// everything else is optional.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoreRecord {
    pub index: Option<i64>,
    pub relevance_score: Option<f64>,
    pub importance_score: Option<f64>,
    pub involves_key_theft: Option<bool>,
    pub key_theft_type: Option<String>,
    pub damage_brief: Option<String>,
    pub adversary: Option<String>,
}

/// First syntactically balanced `[...]` span in free text, by bracket
/// depth. Returns None when no opening bracket exists or the first array
/// never closes.
pub fn extract_balanced_array(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let mut depth = 0i32;
    for (i, ch) in text[start..].char_indices() {
        match ch {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + i + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse the oracle's free-text reply into score records. Anything that is
/// not a balanced, well-formed array yields an empty list — the caller then
/// degrades the whole batch.
pub fn parse_score_records(reply: &str) -> Vec<ScoreRecord> {
    let Some(span) = extract_balanced_array(reply) else {
        return Vec::new();
    };
    serde_json::from_str(span).unwrap_or_default()
}

/// Batch request body: numbered source/title/content excerpts.
pub fn batch_text(batch: &[FreshItem]) -> String {
    let mut out = String::new();
    for (j, item) in batch.iter().enumerate() {
        out.push_str(&format!("\n[{j}] {}\n", item.raw.source_name));
        out.push_str(&format!("Title: {}\n", item.raw.title));
        out.push_str(&format!(
            "Content: {}...\n",
            truncate_chars(&item.raw.content, EXCERPT_CHARS)
        ));
    }
    out
}

fn apply_record(item: FreshItem, record: &ScoreRecord) -> ScoredItem {
    ScoredItem {
        score: record
            .importance_score
            .or(record.relevance_score)
            .map(|s| s.round() as i64)
            .unwrap_or(DEGRADED_SCORE),
        involves_key_theft: record.involves_key_theft.unwrap_or(false),
        key_theft_type: record
            .key_theft_type
            .as_deref()
            .and_then(KeyTheftType::parse),
        damage_brief: record.damage_brief.clone().filter(|s| !s.is_empty()),
        adversary: record.adversary.as_deref().and_then(Adversary::parse),
        is_fresh: item.is_fresh,
        raw: item.raw,
    }
}

/// Score one batch against already-parsed records. Records are matched to
/// items by their 0-based index; out-of-range indices are discarded and
/// uncovered items degrade.
fn score_batch(batch: Vec<FreshItem>, records: &[ScoreRecord]) -> Vec<ScoredItem> {
    let mut slots: Vec<Option<&ScoreRecord>> = vec![None; batch.len()];
    for record in records {
        match record.index {
            Some(idx) if (0..batch.len() as i64).contains(&idx) => {
                let slot = &mut slots[idx as usize];
                if slot.is_none() {
                    *slot = Some(record);
                }
            }
            _ => warn!(index = ?record.index, "discarding score record with bad index"),
        }
    }

    batch
        .into_iter()
        .zip(slots)
        .map(|(item, slot)| match slot {
            Some(record) => apply_record(item, record),
            None => ScoredItem::degraded(item),
        })
        .collect()
}

/// Score all items, category by category, batch by batch, strictly in
/// sequence. Output length always equals input length.
pub async fn score_items(
    oracle: &dyn Oracle,
    policy: &CategoryPolicy,
    items: Vec<FreshItem>,
) -> Vec<ScoredItem> {
    let batch_size = policy.scoring.batch_size.max(1);

    let mut by_category: HashMap<Category, Vec<FreshItem>> = HashMap::new();
    for item in items {
        by_category.entry(item.raw.category).or_default().push(item);
    }

    let mut scored: Vec<ScoredItem> = Vec::new();

    for category in Category::ALL {
        let Some(cat_items) = by_category.remove(&category) else {
            continue;
        };
        let total = cat_items.len();
        let num_batches = total.div_ceil(batch_size);
        info!(%category, items = total, batches = num_batches, "scoring category");

        let mut remaining = cat_items;
        while !remaining.is_empty() {
            let tail = remaining.split_off(remaining.len().min(batch_size));
            let batch = std::mem::replace(&mut remaining, tail);

            let prompt = prompts::scoring_prompt(category, &batch_text(&batch));
            let records = match oracle
                .complete(ModelTier::Fast, SCORING_MAX_TOKENS, &prompt)
                .await
            {
                Ok(reply) => {
                    let records = parse_score_records(&reply);
                    if records.is_empty() {
                        warn!(%category, "no parsable scores in oracle reply, degrading batch");
                    }
                    records
                }
                Err(e) => {
                    warn!(%category, error = ?e, "scoring call failed, degrading batch");
                    Vec::new()
                }
            };

            scored.extend(score_batch(batch, &records));
        }
    }

    info!(scored = scored.len(), "scoring finished");
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RawItem, SourceType};
    use crate::oracle::{MockOracle, MockReply};
    use chrono::Utc;

    fn fresh(title: &str, category: Category) -> FreshItem {
        FreshItem {
            raw: RawItem {
                title: title.to_string(),
                content: "content body".to_string(),
                url: format!("https://example.com/{title}"),
                source_name: "Example Wire".to_string(),
                source_type: SourceType::Media,
                category,
                published_at: None,
                collected_at: Utc::now(),
            },
            is_fresh: true,
        }
    }

    fn policy() -> CategoryPolicy {
        CategoryPolicy::load_default().unwrap()
    }

    #[test]
    fn balanced_array_survives_surrounding_prose() {
        let reply = "blah blah [{\"index\":0,\"relevance_score\":77}] trailing junk";
        let records = parse_score_records(reply);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].index, Some(0));
        assert_eq!(records[0].relevance_score, Some(77.0));
    }

    #[test]
    fn unterminated_array_yields_no_records() {
        assert!(parse_score_records("[{\"index\":0").is_empty());
        assert!(parse_score_records("no array here at all").is_empty());
        assert!(parse_score_records("[[nested but [unbalanced]").is_empty());
    }

    #[test]
    fn nested_brackets_balance_correctly() {
        let reply = "Scores: [{\"index\":0,\"importance_score\":91,\"damage_brief\":\"a[b]c\"}] done";
        let records = parse_score_records(reply);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].importance_score, Some(91.0));
    }

    #[test]
    fn out_of_range_indices_are_discarded() {
        let batch = vec![fresh("a", Category::Geopolitics), fresh("b", Category::Geopolitics)];
        let records = parse_score_records(
            "[{\"index\":1,\"importance_score\":88},{\"index\":7,\"importance_score\":99},{\"index\":-1,\"importance_score\":12}]",
        );
        let scored = score_batch(batch, &records);
        assert_eq!(scored.len(), 2);
        assert_eq!(scored[0].score, DEGRADED_SCORE);
        assert_eq!(scored[1].score, 88);
    }

    #[test]
    fn importance_wins_over_relevance_and_missing_scores_degrade() {
        let batch = vec![fresh("a", Category::Geopolitics)];
        let records = parse_score_records(
            "[{\"index\":0,\"importance_score\":80,\"relevance_score\":20}]",
        );
        let scored = score_batch(batch, &records);
        assert_eq!(scored[0].score, 80);

        let batch = vec![fresh("a", Category::Geopolitics)];
        let records = parse_score_records("[{\"index\":0}]");
        assert_eq!(score_batch(batch, &records)[0].score, DEGRADED_SCORE);
    }

    #[tokio::test]
    async fn total_oracle_failure_loses_no_items() {
        let oracle = MockOracle::new(); // exhausted script: every call fails
        let items: Vec<FreshItem> = (0..23)
            .map(|i| fresh(&format!("item {i}"), Category::CyberAttacks))
            .collect();
        let scored = score_items(&oracle, &policy(), items).await;
        assert_eq!(scored.len(), 23);
        assert!(scored.iter().all(|s| s.score == DEGRADED_SCORE));
        assert!(scored.iter().all(|s| !s.involves_key_theft));
    }

    #[tokio::test]
    async fn batches_are_fixed_size_and_per_category() {
        let oracle = MockOracle::scripted(vec![
            MockReply::Text("[{\"index\":0,\"relevance_score\":95}]".to_string()),
            MockReply::Text("[]".to_string()),
            MockReply::Text("[{\"index\":0,\"importance_score\":71}]".to_string()),
        ]);
        let mut items: Vec<FreshItem> = (0..12)
            .map(|i| fresh(&format!("cyber {i}"), Category::CyberAttacks))
            .collect();
        items.push(fresh("geo", Category::Geopolitics));

        let scored = score_items(&oracle, &policy(), items).await;
        assert_eq!(scored.len(), 13);

        // 12 cyber items → 2 batches, 1 geopolitics batch.
        let prompts = oracle.recorded_prompts();
        assert_eq!(prompts.len(), 3);
        assert!(prompts[0].contains("CYBERSECURITY RELEVANCE"));
        assert!(prompts[0].contains("[9] Example Wire"));
        assert!(!prompts[0].contains("[10]"));
        assert!(prompts[2].contains("GLOBAL IMPORTANCE"));

        // First cyber batch got index 0 scored, rest degraded.
        assert_eq!(scored[0].score, 95);
        assert!(scored[1..12].iter().all(|s| s.score == DEGRADED_SCORE));
        assert_eq!(scored[12].score, 71);
    }

    #[tokio::test]
    async fn key_theft_fields_come_through() {
        let oracle = MockOracle::scripted(vec![MockReply::Text(
            "[{\"index\":0,\"relevance_score\":92,\"involves_key_theft\":true,\
              \"key_theft_type\":\"api_key\",\"damage_brief\":\"tokens exposed\"}]"
                .to_string(),
        )]);
        let scored = score_items(
            &oracle,
            &policy(),
            vec![fresh("breach", Category::CyberAttacks)],
        )
        .await;
        assert!(scored[0].involves_key_theft);
        assert_eq!(scored[0].key_theft_type, Some(KeyTheftType::ApiKey));
        assert_eq!(scored[0].damage_brief.as_deref(), Some("tokens exposed"));
    }
}
