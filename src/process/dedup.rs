// src/process/dedup.rs
//! Title-based deduplication. The same story often lands in several
//! category feeds; exactly one copy survives, chosen by the configured
//! category priority ordering.

use std::collections::HashMap;

use once_cell::sync::OnceCell;
use tracing::info;

use crate::config::categories::CategoryPolicy;
use crate::model::ScoredItem;

/// Dedup key: lowercase, punctuation stripped, whitespace collapsed.
pub fn normalize_title(title: &str) -> String {
    static RE_PUNCT: OnceCell<regex::Regex> = OnceCell::new();
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_punct = RE_PUNCT.get_or_init(|| regex::Regex::new(r"[^\w\s]").unwrap());
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());

    let lowered = title.to_lowercase();
    let stripped = re_punct.replace_all(lowered.trim(), "");
    re_ws.replace_all(&stripped, " ").trim().to_string()
}

/// Collapse duplicate titles, keeping the copy whose category ranks highest
/// in the priority ordering; ties keep the earliest input. Returns the
/// survivors (ordered by first occurrence) and the number removed.
pub fn dedup_items(items: Vec<ScoredItem>, policy: &CategoryPolicy) -> (Vec<ScoredItem>, usize) {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<ScoredItem>> = HashMap::new();

    for item in items {
        let key = normalize_title(&item.raw.title);
        if !groups.contains_key(&key) {
            order.push(key.clone());
        }
        groups.entry(key).or_default().push(item);
    }

    let mut unique = Vec::with_capacity(order.len());
    let mut removed = 0usize;

    for key in order {
        let group = groups.remove(&key).expect("group for key");
        removed += group.len() - 1;
        // min_by_key keeps the first of equals, so same-category ties are
        // resolved by input order.
        let winner = group
            .into_iter()
            .min_by_key(|i| policy.priority_rank(i.raw.category))
            .expect("non-empty group");
        unique.push(winner);
    }

    info!(removed, "deduplicated items");
    (unique, removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, FreshItem, RawItem, SourceType};
    use chrono::Utc;

    fn scored(title: &str, category: Category, score: i64) -> ScoredItem {
        let raw = RawItem {
            title: title.to_string(),
            content: String::new(),
            url: format!("https://example.com/{}", title.len()),
            source_name: "Example".to_string(),
            source_type: SourceType::Media,
            category,
            published_at: None,
            collected_at: Utc::now(),
        };
        let mut item = ScoredItem::degraded(FreshItem {
            raw,
            is_fresh: true,
        });
        item.score = score;
        item
    }

    fn policy() -> CategoryPolicy {
        crate::config::categories::CategoryPolicy::load_default().unwrap()
    }

    #[test]
    fn normalize_strips_punct_case_and_whitespace() {
        assert_eq!(
            normalize_title("  Breaking: APT-29 strikes,   again!  "),
            "breaking apt29 strikes again"
        );
        assert_eq!(normalize_title("Same Title"), normalize_title("same   title?"));
    }

    #[test]
    fn duplicate_keeps_highest_priority_category() {
        let items = vec![
            scored("Big breach hits vendor", Category::Geopolitics, 90),
            scored("Big breach hits vendor!", Category::CyberAttacks, 75),
            scored("Unrelated story", Category::Investment, 80),
        ];
        let (unique, removed) = dedup_items(items, &policy());
        assert_eq!(removed, 1);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].raw.category, Category::CyberAttacks);
        assert_eq!(unique[1].raw.category, Category::Investment);
    }

    #[test]
    fn same_category_tie_keeps_input_order() {
        let items = vec![
            scored("Shared headline", Category::CyberAttacks, 71),
            scored("Shared headline", Category::CyberAttacks, 99),
        ];
        let (unique, removed) = dedup_items(items, &policy());
        assert_eq!(removed, 1);
        assert_eq!(unique[0].score, 71);
    }

    #[test]
    fn output_size_equals_distinct_normalized_titles() {
        let items = vec![
            scored("Alpha", Category::CyberAttacks, 80),
            scored("alpha!", Category::Geopolitics, 80),
            scored("ALPHA", Category::Investment, 80),
            scored("Beta", Category::Investment, 80),
        ];
        let (unique, removed) = dedup_items(items, &policy());
        assert_eq!(unique.len(), 2);
        assert_eq!(removed, 2);
    }
}
