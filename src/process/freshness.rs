// src/process/freshness.rs
//! Freshness classifier: tags each loaded item fresh/stale against a
//! day-dependent window.

use chrono::{DateTime, Datelike, Duration, Utc, Weekday};

use crate::config::categories::FreshnessPolicy;
use crate::model::{FreshItem, RawItem};

/// Window width in hours for a given day. Sunday gets the long-weekend
/// window so Friday/Saturday items still count as fresh.
pub fn window_hours(policy: &FreshnessPolicy, today: Weekday) -> i64 {
    if today == Weekday::Sun {
        policy.long_weekend_hours
    } else {
        policy.default_hours
    }
}

/// Tag each item against `now - window`. The effective timestamp is
/// published_at, falling back to collected_at; items that carry neither a
/// parsable publish time nor anything newer than the cutoff are stale.
pub fn tag_freshness(
    items: Vec<RawItem>,
    now: DateTime<Utc>,
    policy: &FreshnessPolicy,
) -> Vec<FreshItem> {
    let hours = window_hours(policy, now.weekday());
    let cutoff = now - Duration::hours(hours);

    items
        .into_iter()
        .map(|raw| {
            let effective = raw.published_at.unwrap_or(raw.collected_at);
            FreshItem {
                is_fresh: effective >= cutoff,
                raw,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, SourceType};
    use chrono::TimeZone;

    fn policy() -> FreshnessPolicy {
        FreshnessPolicy {
            default_hours: 24,
            long_weekend_hours: 72,
        }
    }

    fn item(published: Option<DateTime<Utc>>, collected: DateTime<Utc>) -> RawItem {
        RawItem {
            title: "t".to_string(),
            content: "c".to_string(),
            url: "https://example.com".to_string(),
            source_name: "Example".to_string(),
            source_type: SourceType::Media,
            category: Category::CyberAttacks,
            published_at: published,
            collected_at: collected,
        }
    }

    #[test]
    fn sunday_widens_the_window() {
        assert_eq!(window_hours(&policy(), Weekday::Sun), 72);
        assert_eq!(window_hours(&policy(), Weekday::Mon), 24);
        assert_eq!(window_hours(&policy(), Weekday::Fri), 24);
    }

    #[test]
    fn boundary_at_24_hours() {
        // A Wednesday, so the 24h window applies.
        let now = Utc.with_ymd_and_hms(2025, 7, 2, 12, 0, 0).unwrap();
        let fresh = tag_freshness(
            vec![item(Some(now - Duration::hours(1)), now)],
            now,
            &policy(),
        );
        assert!(fresh[0].is_fresh);

        let stale = tag_freshness(
            vec![item(Some(now - Duration::hours(25)), now)],
            now,
            &policy(),
        );
        assert!(!stale[0].is_fresh);
    }

    #[test]
    fn sunday_keeps_a_two_day_old_item_fresh() {
        let now = Utc.with_ymd_and_hms(2025, 7, 6, 12, 0, 0).unwrap();
        assert_eq!(now.weekday(), Weekday::Sun);
        let tagged = tag_freshness(
            vec![item(Some(now - Duration::hours(48)), now)],
            now,
            &policy(),
        );
        assert!(tagged[0].is_fresh);
    }

    #[test]
    fn missing_publish_time_falls_back_to_collection_time() {
        let now = Utc.with_ymd_and_hms(2025, 7, 2, 12, 0, 0).unwrap();
        let tagged = tag_freshness(
            vec![
                item(None, now - Duration::hours(2)),
                item(None, now - Duration::hours(30)),
            ],
            now,
            &policy(),
        );
        assert!(tagged[0].is_fresh);
        assert!(!tagged[1].is_fresh);
    }
}
