// src/process/sentiment.rs
//! Aggregate two-axis sentiment: home-bloc vs adversary-bloc headlines,
//! one oracle call, fixed four-field reply format. Everything about this
//! stage degrades: missing fields keep their defaults, a failed call yields
//! the default snapshot.

use tracing::{info, warn};

use super::prompts;
use crate::config::categories::SentimentPolicy;
use crate::model::{AdversaryTempo, Category, FreshItem, SentimentSnapshot, WestMood};
use crate::oracle::{ModelTier, Oracle};

const SENTIMENT_MAX_TOKENS: u32 = 300;
const ORACLE_FAILED_EXPLANATION: &str = "Unable to generate sentiment analysis.";

/// Split a bounded sample of headlines into home and adversary buckets.
/// A headline goes adversary when its category is adversary_cyber or its
/// source name carries a configured marker ("china", "russia").
pub fn bucket_headlines(items: &[FreshItem], policy: &SentimentPolicy) -> (Vec<String>, Vec<String>) {
    let mut west = Vec::new();
    let mut adversary = Vec::new();

    for item in items.iter().take(policy.sample_size) {
        let source = item.raw.source_name.to_lowercase();
        let is_adversary = item.raw.category == Category::AdversaryCyber
            || policy
                .adversary_source_markers
                .iter()
                .any(|m| source.contains(m.as_str()));
        if is_adversary {
            adversary.push(item.raw.title.clone());
        } else {
            west.push(item.raw.title.clone());
        }
    }

    west.truncate(policy.west_headline_cap);
    adversary.truncate(policy.adversary_headline_cap);
    (west, adversary)
}

fn field_value<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    line.strip_prefix(prefix)
        .map(|rest| rest.trim().trim_matches(|c| c == '[' || c == ']'))
}

/// Parse the fixed four-field reply. Any field the oracle dropped or
/// mangled keeps the default (Neutral / Active, empty explanation).
pub fn parse_snapshot(reply: &str) -> SentimentSnapshot {
    let mut snapshot = SentimentSnapshot::default();

    for line in reply.lines() {
        if let Some(v) = field_value(line, "WEST_SENTIMENT:") {
            if let Some(mood) = WestMood::parse(v) {
                snapshot.west_sentiment = mood;
            }
        } else if let Some(v) = field_value(line, "WEST_EXPLANATION:") {
            snapshot.west_explanation = v.to_string();
        } else if let Some(v) = field_value(line, "ADVERSARY_SENTIMENT:") {
            if let Some(tempo) = AdversaryTempo::parse(v) {
                snapshot.adversary_sentiment = tempo;
            }
        } else if let Some(v) = field_value(line, "ADVERSARY_EXPLANATION:") {
            snapshot.adversary_explanation = v.to_string();
        }
    }

    snapshot
}

/// One deep-tier call over the bucketed headlines. Never fails the run.
pub async fn synthesize(
    oracle: &dyn Oracle,
    items: &[FreshItem],
    policy: &SentimentPolicy,
) -> SentimentSnapshot {
    info!("generating sentiment snapshot");

    let (west, adversary) = bucket_headlines(items, policy);
    let west_text = west.join("\n");
    let adversary_text = if adversary.is_empty() {
        "No adversary-specific news collected today.".to_string()
    } else {
        adversary.join("\n")
    };

    let prompt = prompts::sentiment_prompt(&west_text, &adversary_text);
    match oracle
        .complete(ModelTier::Deep, SENTIMENT_MAX_TOKENS, &prompt)
        .await
    {
        Ok(reply) => parse_snapshot(&reply),
        Err(e) => {
            warn!(error = ?e, "sentiment call failed, using default snapshot");
            SentimentSnapshot {
                west_explanation: ORACLE_FAILED_EXPLANATION.to_string(),
                adversary_explanation: ORACLE_FAILED_EXPLANATION.to_string(),
                ..SentimentSnapshot::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RawItem, SourceType};
    use crate::oracle::MockOracle;
    use chrono::Utc;

    fn fresh(title: &str, source: &str, category: Category) -> FreshItem {
        FreshItem {
            raw: RawItem {
                title: title.to_string(),
                content: String::new(),
                url: "https://example.com".to_string(),
                source_name: source.to_string(),
                source_type: SourceType::Media,
                category,
                published_at: None,
                collected_at: Utc::now(),
            },
            is_fresh: true,
        }
    }

    fn policy() -> SentimentPolicy {
        SentimentPolicy {
            adversary_source_markers: vec!["china".to_string(), "russia".to_string()],
            sample_size: 50,
            west_headline_cap: 20,
            adversary_headline_cap: 15,
        }
    }

    #[test]
    fn bucketing_by_category_and_source_markers() {
        let items = vec![
            fresh("a", "BleepingComputer", Category::CyberAttacks),
            fresh("b", "Recorded Future", Category::AdversaryCyber),
            fresh("c", "China Daily Tech", Category::TechDevelopments),
            fresh("d", "Russia Watch", Category::Geopolitics),
        ];
        let (west, adversary) = bucket_headlines(&items, &policy());
        assert_eq!(west, vec!["a"]);
        assert_eq!(adversary, vec!["b", "c", "d"]);
    }

    #[test]
    fn buckets_are_capped() {
        let items: Vec<FreshItem> = (0..60)
            .map(|i| fresh(&format!("h{i}"), "Wire", Category::Geopolitics))
            .collect();
        let (west, adversary) = bucket_headlines(&items, &policy());
        assert_eq!(west.len(), 20);
        assert!(adversary.is_empty());
    }

    #[test]
    fn parse_reads_all_four_fields() {
        let reply = "WEST_SENTIMENT: Concerned\n\
                     WEST_EXPLANATION: Ransomware dominated the cycle. Several agencies issued alerts.\n\
                     ADVERSARY_SENTIMENT: [Aggressive]\n\
                     ADVERSARY_EXPLANATION: Multiple APT campaigns attributed this week.";
        let s = parse_snapshot(reply);
        assert_eq!(s.west_sentiment, WestMood::Concerned);
        assert_eq!(s.adversary_sentiment, AdversaryTempo::Aggressive);
        assert!(s.west_explanation.starts_with("Ransomware"));
        assert!(s.adversary_explanation.starts_with("Multiple APT"));
    }

    #[test]
    fn missing_or_unknown_fields_keep_defaults() {
        let s = parse_snapshot("WEST_SENTIMENT: Exuberant\nsome chatter");
        assert_eq!(s.west_sentiment, WestMood::Neutral);
        assert_eq!(s.adversary_sentiment, AdversaryTempo::Active);
        assert!(s.west_explanation.is_empty());
    }

    #[tokio::test]
    async fn oracle_failure_yields_default_snapshot() {
        let oracle = MockOracle::new();
        let s = synthesize(&oracle, &[], &policy()).await;
        assert_eq!(s.west_sentiment, WestMood::Neutral);
        assert_eq!(s.adversary_sentiment, AdversaryTempo::Active);
        assert_eq!(s.west_explanation, ORACLE_FAILED_EXPLANATION);
    }

    #[tokio::test]
    async fn empty_adversary_bucket_gets_placeholder_line() {
        let oracle = MockOracle::new();
        let items = vec![fresh("a", "Wire", Category::Geopolitics)];
        let _ = synthesize(&oracle, &items, &policy()).await;
        // The prompt was still built and recorded before the scripted failure.
        let prompts = oracle.recorded_prompts();
        assert!(prompts[0].contains("No adversary-specific news collected today."));
    }
}
