// src/model.rs
//! Core records flowing through the pipeline. All of these are value-like:
//! each stage consumes one shape and produces the next, no shared mutation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The fixed category set. Order here is declaration order only; the dedup
/// priority ordering lives in `config/categories.toml`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    CyberAttacks,
    AuthIdentity,
    SaasSecurity,
    AdversaryCyber,
    ResearchUpdates,
    Investment,
    LegalRegulations,
    TechDevelopments,
    Geopolitics,
    TargetIsrael,
    TargetEurope,
    TargetUs,
    TargetSouthKorea,
    TargetJapan,
}

impl Category {
    pub const ALL: [Category; 14] = [
        Category::CyberAttacks,
        Category::AuthIdentity,
        Category::SaasSecurity,
        Category::AdversaryCyber,
        Category::ResearchUpdates,
        Category::Investment,
        Category::LegalRegulations,
        Category::TechDevelopments,
        Category::Geopolitics,
        Category::TargetIsrael,
        Category::TargetEurope,
        Category::TargetUs,
        Category::TargetSouthKorea,
        Category::TargetJapan,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::CyberAttacks => "cyber_attacks",
            Category::AuthIdentity => "auth_identity",
            Category::SaasSecurity => "saas_security",
            Category::AdversaryCyber => "adversary_cyber",
            Category::ResearchUpdates => "research_updates",
            Category::Investment => "investment",
            Category::LegalRegulations => "legal_regulations",
            Category::TechDevelopments => "tech_developments",
            Category::Geopolitics => "geopolitics",
            Category::TargetIsrael => "target_israel",
            Category::TargetEurope => "target_europe",
            Category::TargetUs => "target_us",
            Category::TargetSouthKorea => "target_south_korea",
            Category::TargetJapan => "target_japan",
        }
    }

    pub fn parse(s: &str) -> Option<Category> {
        Category::ALL.iter().copied().find(|c| c.as_str() == s)
    }

    /// Display name for the regional market sections, None for the rest.
    pub fn market_name(self) -> Option<&'static str> {
        match self {
            Category::TargetIsrael => Some("Israel"),
            Category::TargetEurope => Some("Europe"),
            Category::TargetUs => Some("US"),
            Category::TargetSouthKorea => Some("South Korea"),
            Category::TargetJapan => Some("Japan"),
            _ => None,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dashboard-facing classification of where a feed comes from, derived from
/// source name/url keyword tables at collection time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum SourceType {
    Government,
    Academic,
    NonProfit,
    Independent,
    Commercial,
    Media,
}

impl SourceType {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceType::Government => "GOVERNMENT",
            SourceType::Academic => "ACADEMIC",
            SourceType::NonProfit => "NON-PROFIT",
            SourceType::Independent => "INDEPENDENT",
            SourceType::Commercial => "COMMERCIAL",
            SourceType::Media => "MEDIA",
        }
    }
}

/// One collected feed entry. Title and content are truncated at ingestion;
/// the url is display identity, the title is the dedup key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawItem {
    pub title: String,
    pub content: String,
    pub url: String,
    pub source_name: String,
    pub source_type: SourceType,
    pub category: Category,
    pub published_at: Option<DateTime<Utc>>,
    pub collected_at: DateTime<Utc>,
}

/// RawItem annotated by the freshness classifier at load time.
#[derive(Debug, Clone)]
pub struct FreshItem {
    pub raw: RawItem,
    pub is_fresh: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyTheftType {
    Credential,
    ApiKey,
    Token,
    Certificate,
    PrivateKey,
    MfaBypass,
}

impl KeyTheftType {
    pub fn parse(s: &str) -> Option<KeyTheftType> {
        match s {
            "credential" => Some(KeyTheftType::Credential),
            "api_key" => Some(KeyTheftType::ApiKey),
            "token" => Some(KeyTheftType::Token),
            "certificate" => Some(KeyTheftType::Certificate),
            "private_key" => Some(KeyTheftType::PrivateKey),
            "mfa_bypass" => Some(KeyTheftType::MfaBypass),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            KeyTheftType::Credential => "credential",
            KeyTheftType::ApiKey => "api_key",
            KeyTheftType::Token => "token",
            KeyTheftType::Certificate => "certificate",
            KeyTheftType::PrivateKey => "private_key",
            KeyTheftType::MfaBypass => "mfa_bypass",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Adversary {
    China,
    Russia,
    Iran,
    NorthKorea,
}

impl Adversary {
    pub fn parse(s: &str) -> Option<Adversary> {
        match s {
            "china" => Some(Adversary::China),
            "russia" => Some(Adversary::Russia),
            "iran" => Some(Adversary::Iran),
            "north_korea" => Some(Adversary::NorthKorea),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Adversary::China => "china",
            Adversary::Russia => "russia",
            Adversary::Iran => "iran",
            Adversary::NorthKorea => "north_korea",
        }
    }
}

/// Output of the scoring stage: one per input item, always. A failed or
/// partial oracle response degrades to `ScoredItem::degraded`, it never
/// drops the item.
#[derive(Debug, Clone)]
pub struct ScoredItem {
    pub raw: RawItem,
    pub is_fresh: bool,
    pub score: i64,
    pub involves_key_theft: bool,
    pub key_theft_type: Option<KeyTheftType>,
    pub damage_brief: Option<String>,
    pub adversary: Option<Adversary>,
}

/// Neutral score substituted when the oracle fails or omits an item.
pub const DEGRADED_SCORE: i64 = 50;

impl ScoredItem {
    pub fn degraded(item: FreshItem) -> Self {
        Self {
            raw: item.raw,
            is_fresh: item.is_fresh,
            score: DEGRADED_SCORE,
            involves_key_theft: false,
            key_theft_type: None,
            damage_brief: None,
            adversary: None,
        }
    }
}

/// A scored item that made the daily digest, with its dense per-category
/// rank and oracle-written summary.
#[derive(Debug, Clone)]
pub struct SelectedItem {
    pub scored: ScoredItem,
    pub rank: u32,
    pub summary: String,
}

/// Overall mood of the home-bloc coverage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WestMood {
    Optimistic,
    CautiouslyOptimistic,
    Neutral,
    Concerned,
    Alarmed,
}

impl WestMood {
    /// Case-insensitive parse of an oracle label; unknown text keeps the
    /// documented default (Neutral).
    pub fn parse(s: &str) -> Option<WestMood> {
        match s.trim().to_ascii_lowercase().as_str() {
            "optimistic" => Some(WestMood::Optimistic),
            "cautiously optimistic" => Some(WestMood::CautiouslyOptimistic),
            "neutral" => Some(WestMood::Neutral),
            "concerned" => Some(WestMood::Concerned),
            "alarmed" => Some(WestMood::Alarmed),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WestMood::Optimistic => "Optimistic",
            WestMood::CautiouslyOptimistic => "Cautiously Optimistic",
            WestMood::Neutral => "Neutral",
            WestMood::Concerned => "Concerned",
            WestMood::Alarmed => "Alarmed",
        }
    }
}

/// Activity level read off the adversary-bloc coverage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdversaryTempo {
    Quiet,
    Active,
    Aggressive,
    Escalating,
}

impl AdversaryTempo {
    pub fn parse(s: &str) -> Option<AdversaryTempo> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quiet" => Some(AdversaryTempo::Quiet),
            "active" => Some(AdversaryTempo::Active),
            "aggressive" => Some(AdversaryTempo::Aggressive),
            "escalating" => Some(AdversaryTempo::Escalating),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AdversaryTempo::Quiet => "Quiet",
            AdversaryTempo::Active => "Active",
            AdversaryTempo::Aggressive => "Aggressive",
            AdversaryTempo::Escalating => "Escalating",
        }
    }
}

/// Two-axis sentiment signal produced once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentimentSnapshot {
    pub west_sentiment: WestMood,
    pub west_explanation: String,
    pub adversary_sentiment: AdversaryTempo,
    pub adversary_explanation: String,
}

impl Default for SentimentSnapshot {
    fn default() -> Self {
        Self {
            west_sentiment: WestMood::Neutral,
            west_explanation: String::new(),
            adversary_sentiment: AdversaryTempo::Active,
            adversary_explanation: String::new(),
        }
    }
}

/// Character-based truncation; feed text is not guaranteed to sit on byte
/// boundaries.
pub fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_roundtrip() {
        for c in Category::ALL {
            assert_eq!(Category::parse(c.as_str()), Some(c));
        }
        assert_eq!(Category::parse("public_opinions"), None);
    }

    #[test]
    fn category_serde_uses_snake_case() {
        let json = serde_json::to_string(&Category::TargetSouthKorea).unwrap();
        assert_eq!(json, "\"target_south_korea\"");
        let back: Category = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Category::TargetSouthKorea);
    }

    #[test]
    fn mood_labels_parse_case_insensitively() {
        assert_eq!(
            WestMood::parse("Cautiously Optimistic"),
            Some(WestMood::CautiouslyOptimistic)
        );
        assert_eq!(WestMood::parse("ALARMED"), Some(WestMood::Alarmed));
        assert_eq!(WestMood::parse("jubilant"), None);
        assert_eq!(AdversaryTempo::parse(" escalating "), Some(AdversaryTempo::Escalating));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let s = "日本語テキスト";
        assert_eq!(truncate_chars(s, 3), "日本語");
        assert_eq!(truncate_chars("short", 10), "short");
    }
}
