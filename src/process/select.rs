// src/process/select.rs
//! Top-N selection with the fresh-first/backfill policy. Freshness
//! dominates at the selection boundary: a stale item can only take slots
//! the fresh pool left open, no matter how high it scored.

use std::collections::HashMap;

use tracing::info;

use crate::config::categories::CategoryPolicy;
use crate::model::{Category, ScoredItem};

/// A digest slot before summarization: scored item plus its dense
/// per-category rank.
#[derive(Debug, Clone)]
pub struct RankedItem {
    pub scored: ScoredItem,
    pub rank: u32,
}

/// Per category: up to `per_category` fresh items by score, backfilled from
/// stale items by score, all above the threshold. Ranks are dense 1..k in
/// selection order. A category with nothing above the threshold yields
/// nothing.
pub fn select_top(items: Vec<ScoredItem>, policy: &CategoryPolicy) -> Vec<RankedItem> {
    let threshold = policy.selection.score_threshold;
    let per_category = policy.selection.per_category;

    let mut fresh_by_cat: HashMap<Category, Vec<ScoredItem>> = HashMap::new();
    let mut stale_by_cat: HashMap<Category, Vec<ScoredItem>> = HashMap::new();

    let mut fresh_total = 0usize;
    let mut stale_total = 0usize;
    for item in items {
        if item.score < threshold {
            continue;
        }
        let bucket = if item.is_fresh {
            fresh_total += 1;
            &mut fresh_by_cat
        } else {
            stale_total += 1;
            &mut stale_by_cat
        };
        bucket.entry(item.raw.category).or_default().push(item);
    }
    info!(
        fresh = fresh_total,
        stale = stale_total,
        threshold,
        "items above threshold"
    );

    let mut selected = Vec::new();

    for category in Category::ALL {
        let mut cat_fresh = fresh_by_cat.remove(&category).unwrap_or_default();
        let mut cat_stale = stale_by_cat.remove(&category).unwrap_or_default();
        // Stable sorts: score ties keep input order.
        cat_fresh.sort_by(|a, b| b.score.cmp(&a.score));
        cat_stale.sort_by(|a, b| b.score.cmp(&a.score));

        let mut top: Vec<ScoredItem> = cat_fresh.into_iter().take(per_category).collect();
        let backfill = per_category - top.len();
        top.extend(cat_stale.into_iter().take(backfill));

        let fresh_count = top.iter().filter(|i| i.is_fresh).count();
        info!(
            %category,
            picked = top.len(),
            fresh = fresh_count,
            stale = top.len() - fresh_count,
            "category selection"
        );

        selected.extend(
            top.into_iter()
                .enumerate()
                .map(|(i, scored)| RankedItem {
                    scored,
                    rank: (i + 1) as u32,
                }),
        );
    }

    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FreshItem, RawItem, SourceType};
    use chrono::Utc;

    fn item(category: Category, score: i64, is_fresh: bool) -> ScoredItem {
        let raw = RawItem {
            title: format!("{category} {score} {is_fresh}"),
            content: String::new(),
            url: "https://example.com".to_string(),
            source_name: "Example".to_string(),
            source_type: SourceType::Media,
            category,
            published_at: None,
            collected_at: Utc::now(),
        };
        let mut scored = ScoredItem::degraded(FreshItem { raw, is_fresh });
        scored.score = score;
        scored
    }

    fn policy() -> CategoryPolicy {
        CategoryPolicy::load_default().unwrap()
    }

    #[test]
    fn fresh_items_outrank_higher_scoring_stale_items() {
        let cat = Category::CyberAttacks;
        let items = vec![
            item(cat, 95, true),
            item(cat, 80, true),
            item(cat, 71, true),
            item(cat, 99, false),
            item(cat, 90, false),
            item(cat, 85, false),
            item(cat, 70, false),
        ];
        let selected = select_top(items, &policy());
        assert_eq!(selected.len(), 5);

        let picks: Vec<(i64, bool, u32)> = selected
            .iter()
            .map(|r| (r.scored.score, r.scored.is_fresh, r.rank))
            .collect();
        assert_eq!(
            picks,
            vec![
                (95, true, 1),
                (80, true, 2),
                (71, true, 3),
                (99, false, 4),
                (90, false, 5),
            ]
        );
    }

    #[test]
    fn threshold_filters_and_empty_categories_are_legitimate() {
        let items = vec![
            item(Category::Investment, 69, true),
            item(Category::Investment, 50, true),
        ];
        let selected = select_top(items, &policy());
        assert!(selected.is_empty());
    }

    #[test]
    fn ranks_are_dense_per_category() {
        let items = vec![
            item(Category::CyberAttacks, 90, true),
            item(Category::CyberAttacks, 80, false),
            item(Category::Geopolitics, 75, false),
        ];
        let selected = select_top(items, &policy());
        assert_eq!(selected.len(), 3);

        let cyber: Vec<u32> = selected
            .iter()
            .filter(|r| r.scored.raw.category == Category::CyberAttacks)
            .map(|r| r.rank)
            .collect();
        assert_eq!(cyber, vec![1, 2]);

        let geo: Vec<u32> = selected
            .iter()
            .filter(|r| r.scored.raw.category == Category::Geopolitics)
            .map(|r| r.rank)
            .collect();
        assert_eq!(geo, vec![1]);
    }

    #[test]
    fn quota_caps_a_deep_fresh_pool() {
        let cat = Category::Geopolitics;
        let items: Vec<ScoredItem> = (0..8).map(|i| item(cat, 90 - i, true)).collect();
        let selected = select_top(items, &policy());
        assert_eq!(selected.len(), 5);
        assert_eq!(selected[0].scored.score, 90);
        assert_eq!(selected[4].scored.score, 86);
    }
}
