// src/process/prompts.rs
//! Rubric table: one data record per category holding the scoring and
//! summary instruction templates. Adding a category is a table entry, not a
//! new code path. Placeholders ({items}, {title}, {source}, {content},
//! {key_theft_note}, {damage_note}, {adversary}, {market}) are substituted
//! at render time.

use crate::model::{Category, ScoredItem};

pub struct Rubric {
    pub scoring: &'static str,
    pub summary: &'static str,
}

const GEOPOLITICS_SCORING: &str = r#"Score these news items by GLOBAL IMPORTANCE.

This is for a "Geopolitics" section showing the most important world events.

For each item, score:
- importance_score (0-100): How significant is this event globally?
  - 90-100: Major international crisis, war development, superpower actions
  - 70-89: Significant diplomatic events, major elections, sanctions
  - 50-69: Notable political developments
  - Below 50: Local news, minor events, not globally significant

Items:
{items}

Respond ONLY with valid JSON array:
[{"index": 0, "importance_score": XX}, ...]"#;

const CYBER_ATTACKS_SCORING: &str = r#"Score these news items for CYBERSECURITY RELEVANCE.

This is for a "Cyber Attacks" section for a cybersecurity startup CEO.

For each item, score:
- relevance_score (0-100): How relevant for cybersecurity industry?
  - 90-100: Major breach, nation-state attack, critical vulnerability
  - 70-89: Significant security incident, new threat actor
  - 50-69: Notable security news
  - Below 50: Not cybersecurity related
- involves_key_theft (true/false): Involves stolen credentials, keys, tokens, auth bypass
- key_theft_type: If true, specify: "credential", "api_key", "token", "certificate", "private_key", "mfa_bypass"
- damage_brief: Very brief damage description (e.g., "500K records leaked", "$10M ransom paid", "no confirmed damage yet")

Items:
{items}

Respond ONLY with valid JSON array:
[{"index": 0, "relevance_score": XX, "involves_key_theft": false, "key_theft_type": null, "damage_brief": "..."}, ...]"#;

const TECH_DEVELOPMENTS_SCORING: &str = r#"Score these news items by how BREAKTHROUGH and UNCONVENTIONAL they are.

This is for a "Tech Developments" section showing the most outstanding technological advancements across ALL domains.

For each item, score:
- importance_score (0-100): How breakthrough and non-canonical is this?
  - 90-100: Paradigm-shifting invention, challenges existing assumptions, truly novel approach
  - 70-89: Significant advancement, unusual solution, notable innovation
  - 50-69: Solid progress but conventional approach
  - Below 50: Incremental updates, routine product releases, not innovative

Prefer: unexpected discoveries, unconventional methods, cross-domain innovations

Items:
{items}

Respond ONLY with valid JSON array:
[{"index": 0, "importance_score": XX}, ...]"#;

const AUTH_IDENTITY_SCORING: &str = r#"Score these news items for AUTHORIZATION/IDENTITY RELEVANCE.

This is for an "Authorization & Identity" section for a startup building auth/identity solutions.

For each item, score:
- relevance_score (0-100): How relevant to authorization/identity industry?
  - 90-100: Industry-wide news, standards updates, major vendor announcements affecting the whole domain
  - 70-89: Significant auth/identity developments with broad implications
  - 50-69: Tangentially related (general security with identity angle)
  - Below 40: Single product features, tutorials, how-to guides, company-specific blog posts about minor features

IMPORTANT: Filter OUT blog posts about individual product features or tutorials. Only include news that affects the authorization/identity domain widely.

Items:
{items}

Respond ONLY with valid JSON array:
[{"index": 0, "relevance_score": XX}, ...]"#;

const SAAS_SECURITY_SCORING: &str = r#"Score these news items for SAAS SECURITY RELEVANCE.

This is for a "SaaS Security" section covering security of SaaS applications and vendors.

For each item, score:
- relevance_score (0-100): How relevant to SaaS security?
  - 90-100: Major SaaS breach (Salesforce, Workday, ServiceNow, Slack, etc.), SaaS supply chain attack, critical SaaS vulnerability
  - 70-89: SaaS vendor security announcement, SOC2/ISO27001 certification, SaaS security product launch, OAuth/token security issues
  - 50-69: General cloud security with SaaS angle, enterprise software security
  - Below 40: Pure infrastructure (AWS/Azure/GCP), on-premise software, general IT news

IMPORTANT: Focus on SaaS APPLICATIONS (Salesforce, Workday, Microsoft 365, Google Workspace, Slack, ServiceNow, etc.) not cloud infrastructure providers.

Items:
{items}

Respond ONLY with valid JSON array:
[{"index": 0, "relevance_score": XX}, ...]"#;

const RESEARCH_UPDATES_SCORING: &str = r#"Score these news items for RESEARCH RELEVANCE to authorization, authentication, and biometry.

This is for a "Research Updates" section focused STRICTLY on authentication, authorization, identity, and biometric research.

For each item, score:
- relevance_score (0-100): How relevant to auth/identity/biometry research?
  - 90-100: Directly about authentication, authorization, identity verification, biometrics, cryptographic identity
  - 70-89: Access control research, identity protocols, credential systems
  - 50-69: Related but not core (general crypto, tangential security)
  - Below 40: General cybersecurity research NOT about auth/identity/biometry

IMPORTANT: Only score high if the research is specifically about authentication, authorization, identity, or biometrics. General malware, network security, or other cyber research should score below 40.

Items:
{items}

Respond ONLY with valid JSON array:
[{"index": 0, "relevance_score": XX}, ...]"#;

const TARGET_ISRAEL_SCORING: &str = r#"Score these news items for ISRAEL CYBER/TECH MARKET RELEVANCE.

This is for an "Israel Market" section showing CYBER and TECH news relevant to Israel.

For each item, score:
- relevance_score (0-100): How relevant to Israeli CYBER/TECH market?
  - 90-100: Israeli cybersecurity companies, Israeli tech startups, Israeli government cyber policy
  - 70-89: Israeli tech investments, Israeli cyber incidents, defense tech
  - 50-69: Israeli tech ecosystem news
  - Below 50: General Israeli news NOT about cyber/tech (politics, entertainment, pharma, etc.)

IMPORTANT: Only include news about cybersecurity, technology, startups, or tech policy. Filter out general business, politics, entertainment, pharma, or non-tech news.

Items:
{items}

Respond ONLY with valid JSON array:
[{"index": 0, "relevance_score": XX}, ...]"#;

const TARGET_EUROPE_SCORING: &str = r#"Score these news items for EUROPE CYBER/TECH MARKET RELEVANCE.

This is for a "Europe Market" section showing CYBER and TECH news relevant to Europe.

For each item, score:
- relevance_score (0-100): How relevant to European CYBER/TECH market?
  - 90-100: EU cyber regulations (GDPR, NIS2, Cyber Resilience Act), European cybersecurity companies
  - 70-89: European tech policy, major European cyber incidents, EU tech investments
  - 50-69: European tech ecosystem news
  - Below 50: General European news NOT about cyber/tech

IMPORTANT: Only include news about cybersecurity, technology, tech regulations, or tech policy. Filter out general politics, entertainment, or non-tech news.

Items:
{items}

Respond ONLY with valid JSON array:
[{"index": 0, "relevance_score": XX}, ...]"#;

const TARGET_US_SCORING: &str = r#"Score these news items for US CYBER/TECH MARKET RELEVANCE.

This is for a "US Market" section showing CYBER and TECH news relevant to United States.

For each item, score:
- relevance_score (0-100): How relevant to US CYBER/TECH market?
  - 90-100: US federal cyber policy, CISA directives, major US cybersecurity companies
  - 70-89: US tech regulations, significant US cyber incidents, US defense tech
  - 50-69: US tech ecosystem news
  - Below 50: General US news NOT about cyber/tech

IMPORTANT: Only include news about cybersecurity, technology, or tech policy. Filter out general politics, entertainment, or non-tech news.

Items:
{items}

Respond ONLY with valid JSON array:
[{"index": 0, "relevance_score": XX}, ...]"#;

const TARGET_SOUTH_KOREA_SCORING: &str = r#"Score these news items for SOUTH KOREA CYBER/TECH MARKET RELEVANCE.

This is for a "South Korea Market" section showing CYBER and TECH news relevant to South Korea.

For each item, score:
- relevance_score (0-100): How relevant to South Korean CYBER/TECH market?
  - 90-100: Korean cybersecurity companies, Korean tech giants (Samsung, LG tech divisions), Korean government cyber policy
  - 70-89: Korean tech investments, Korean cyber incidents, semiconductor/tech manufacturing
  - 50-69: Korean tech ecosystem news
  - Below 50: General Korean news NOT about cyber/tech (K-pop, politics, general business)

IMPORTANT: Only include news about cybersecurity, technology, semiconductors, or tech policy. Filter out general news, entertainment, or non-tech business.

Items:
{items}

Respond ONLY with valid JSON array:
[{"index": 0, "relevance_score": XX}, ...]"#;

const TARGET_JAPAN_SCORING: &str = r#"Score these news items for JAPAN CYBER/TECH MARKET RELEVANCE.

This is for a "Japan Market" section showing CYBER and TECH news relevant to Japan.

For each item, score:
- relevance_score (0-100): How relevant to Japanese CYBER/TECH market?
  - 90-100: Japanese cybersecurity companies, Japanese tech giants, Japanese government cyber policy
  - 70-89: Japanese tech investments, Japanese cyber incidents, robotics/AI developments
  - 50-69: Japanese tech ecosystem news
  - Below 50: General Japanese news NOT about cyber/tech (politics, entertainment, general business)

IMPORTANT: Only include news about cybersecurity, technology, robotics, AI, or tech policy. Filter out general politics, entertainment, or non-tech news.

Items:
{items}

Respond ONLY with valid JSON array:
[{"index": 0, "relevance_score": XX}, ...]"#;

const INVESTMENT_SCORING: &str = r#"Score these news items for INVESTMENT DEAL relevance in Cybersecurity, DeepTech, or DefenseTech.

This is for an "Investment" section tracking ONLY actual funding rounds, M&A, and exits.

For each item, score:
- relevance_score (0-100): Is this an actual deal announcement?
  - 90-100: Specific funding round, acquisition, or IPO announcement with deal details
  - 70-89: Confirmed deal with some details missing
  - Below 40: Market reports, investor opinions, trend articles, listicles, predictions - NOT actual deals

IMPORTANT: Only include ACTUAL DEAL ANNOUNCEMENTS. Filter out articles about "top investors", "market trends", "predictions", or general reports. We want specific company + specific funding amount/acquisition.

Items:
{items}

Respond ONLY with valid JSON array:
[{"index": 0, "relevance_score": XX}, ...]"#;

const LEGAL_REGULATIONS_SCORING: &str = r#"Score these news items for LEGAL/REGULATORY RELEVANCE to cybersecurity, identity, and authorization.

This is for a "Legal & Regulations" section tracking laws and compliance affecting cyber/identity/auth industry.

For each item, score:
- relevance_score (0-100): How relevant as legal/regulatory news?
  - 90-100: New cyber/identity/auth laws, data protection regulations, compliance mandates
  - 70-89: Proposed legislation, regulatory guidance, enforcement actions in security/identity
  - 50-69: Legal news with cybersecurity/identity implications
  - Below 50: Not legal/regulatory or not related to cyber/identity/auth

Items:
{items}

Respond ONLY with valid JSON array:
[{"index": 0, "relevance_score": XX}, ...]"#;

const ADVERSARY_CYBER_SCORING: &str = r#"Score these news items for ADVERSARY CYBER ACTIVITY relevance.

This is for an "Adversary Cyber" section tracking cyber activities from China, Russia, Iran, and North Korea.

For each item, score:
- relevance_score (0-100): How relevant to adversary cyber tracking?
  - 90-100: Direct attribution to China/Russia/Iran/North Korea cyber operations, APT activities
  - 70-89: Suspected nation-state activity, adversary capability developments
  - 50-69: News about these nations' tech/cyber policies
  - Below 50: Not related to adversary cyber activities
- adversary: Which nation - "china", "russia", "iran", "north_korea", or null

Items:
{items}

Respond ONLY with valid JSON array:
[{"index": 0, "relevance_score": XX, "adversary": "china"}, ...]"#;

const GEOPOLITICS_SUMMARY: &str = r#"Write a 2 sentence analysis of this world event. Maximum 3 lines total.

Rules:
- Sentence 1: Additional context NOT already in the title
- Sentence 2: Potential consequences - what important things might happen because of this
- No markdown formatting

Title (do not repeat this): {title}
Source: {source}
Content: {content}

Analysis (context + consequences, max 3 lines):"#;

const CYBER_ATTACKS_SUMMARY: &str = r#"Write a 1-2 sentence summary of this cybersecurity news. Maximum 3 lines total.

Rules:
- Do NOT repeat information already in the title
- Only add NEW information: impact, damage, who was affected
- No markdown formatting
{key_theft_note}

Title (do not repeat this): {title}
Source: {source}
Content: {content}
{damage_note}

Summary (new info only, max 3 lines):"#;

const TECH_DEVELOPMENTS_SUMMARY: &str = r#"Write exactly 2 sentences about this technology news. Maximum 2 lines total.

Rules:
- Do NOT repeat information already in the title
- Sentence 1: What is this and why does it matter?
- Sentence 2: Key implication or what it enables
- No markdown formatting
- Keep it brief - exactly 2 sentences

Title (do not repeat this): {title}
Source: {source}
Content: {content}

Summary (exactly 2 sentences):"#;

const AUTH_IDENTITY_SUMMARY: &str = r#"Write analysis of this authorization/identity news in two parts. Maximum 3 lines total.

Rules:
- Do NOT repeat information already in the title
- No markdown formatting

Title (do not repeat this): {title}
Source: {source}
Content: {content}

Context: How does this compare to existing solutions, approaches, and best practices in the auth/identity space?

Analysis: What's new, who's affected, market implications?"#;

const SAAS_SECURITY_SUMMARY: &str = r#"Write exactly 2 sentences about this SaaS security news. Maximum 2 lines total.

Rules:
- Do NOT repeat information already in the title
- Sentence 1: What happened (which SaaS, what security issue/announcement)
- Sentence 2: Business impact or implications for SaaS users
- No markdown formatting

Title (do not repeat this): {title}
Source: {source}
Content: {content}

Summary (exactly 2 sentences):"#;

const RESEARCH_UPDATES_SUMMARY: &str = r#"Write analysis of this research in two parts. Maximum 3 lines total.

Rules:
- Do NOT repeat information already in the title
- No markdown formatting

Title (do not repeat this): {title}
Source: {source}
Content: {content}

Context: How does this compare to existing solutions, best practices, and current approaches?

Finding: What's the key finding and its practical significance?"#;

const TARGET_MARKET_SUMMARY: &str = r#"Write a 1-2 sentence analysis of this {market} cyber/tech market news. Maximum 3 lines total.

Rules:
- Do NOT repeat information already in the title
- Focus on: market impact, relevance to local tech/cyber ecosystem
- No markdown formatting

Title (do not repeat this): {title}
Source: {source}
Content: {content}

Analysis (market impact, max 3 lines):"#;

const INVESTMENT_SUMMARY: &str = r#"Extract key deal information in 1 sentence. Maximum 1 line.

Format: [Round type] [Amount] at [Valuation] from [Key Investors]. Founded by [Founders] - [One line company description]

Only include information that is explicitly stated. Skip fields if not mentioned.

Title: {title}
Source: {source}
Content: {content}

Deal summary (1 sentence):"#;

const LEGAL_REGULATIONS_SUMMARY: &str = r#"Write a 1-2 sentence analysis of this legal/regulatory news. Maximum 2 lines total.

Rules:
- Do NOT repeat information already in the title
- Focus on: potential implications for cybersecurity/identity/authorization industry
- Keep it very brief - maximum 2 lines
- No markdown formatting

Title (do not repeat this): {title}
Source: {source}
Content: {content}

Implications:"#;

const ADVERSARY_CYBER_SUMMARY: &str = r#"Write exactly 2 sentences about this {adversary} cyber activity. Maximum 2 lines total.

Rules:
- Do NOT repeat information already in the title
- Sentence 1: What happened (tactics, targets)
- Sentence 2: Why it matters (implications)
- No markdown formatting
- Keep it brief - exactly 2 sentences

Title (do not repeat this): {title}
Source: {source}
Content: {content}

Summary (exactly 2 sentences):"#;

/// The table itself: one (category, rubric) row per entry.
pub static RUBRICS: [(Category, Rubric); 14] = [
    (
        Category::CyberAttacks,
        Rubric {
            scoring: CYBER_ATTACKS_SCORING,
            summary: CYBER_ATTACKS_SUMMARY,
        },
    ),
    (
        Category::AuthIdentity,
        Rubric {
            scoring: AUTH_IDENTITY_SCORING,
            summary: AUTH_IDENTITY_SUMMARY,
        },
    ),
    (
        Category::SaasSecurity,
        Rubric {
            scoring: SAAS_SECURITY_SCORING,
            summary: SAAS_SECURITY_SUMMARY,
        },
    ),
    (
        Category::AdversaryCyber,
        Rubric {
            scoring: ADVERSARY_CYBER_SCORING,
            summary: ADVERSARY_CYBER_SUMMARY,
        },
    ),
    (
        Category::ResearchUpdates,
        Rubric {
            scoring: RESEARCH_UPDATES_SCORING,
            summary: RESEARCH_UPDATES_SUMMARY,
        },
    ),
    (
        Category::Investment,
        Rubric {
            scoring: INVESTMENT_SCORING,
            summary: INVESTMENT_SUMMARY,
        },
    ),
    (
        Category::LegalRegulations,
        Rubric {
            scoring: LEGAL_REGULATIONS_SCORING,
            summary: LEGAL_REGULATIONS_SUMMARY,
        },
    ),
    (
        Category::TechDevelopments,
        Rubric {
            scoring: TECH_DEVELOPMENTS_SCORING,
            summary: TECH_DEVELOPMENTS_SUMMARY,
        },
    ),
    (
        Category::Geopolitics,
        Rubric {
            scoring: GEOPOLITICS_SCORING,
            summary: GEOPOLITICS_SUMMARY,
        },
    ),
    (
        Category::TargetIsrael,
        Rubric {
            scoring: TARGET_ISRAEL_SCORING,
            summary: TARGET_MARKET_SUMMARY,
        },
    ),
    (
        Category::TargetEurope,
        Rubric {
            scoring: TARGET_EUROPE_SCORING,
            summary: TARGET_MARKET_SUMMARY,
        },
    ),
    (
        Category::TargetUs,
        Rubric {
            scoring: TARGET_US_SCORING,
            summary: TARGET_MARKET_SUMMARY,
        },
    ),
    (
        Category::TargetSouthKorea,
        Rubric {
            scoring: TARGET_SOUTH_KOREA_SCORING,
            summary: TARGET_MARKET_SUMMARY,
        },
    ),
    (
        Category::TargetJapan,
        Rubric {
            scoring: TARGET_JAPAN_SCORING,
            summary: TARGET_MARKET_SUMMARY,
        },
    ),
];

pub fn rubric(category: Category) -> &'static Rubric {
    RUBRICS
        .iter()
        .find(|(c, _)| *c == category)
        .map(|(_, r)| r)
        .expect("rubric table covers every category")
}

/// Render the scoring request for one batch.
pub fn scoring_prompt(category: Category, items_text: &str) -> String {
    rubric(category).scoring.replace("{items}", items_text)
}

/// Render the summary request for one selected item. `content` is the
/// (possibly translated) excerpt the caller wants summarized.
pub fn summary_prompt(item: &ScoredItem, content: &str) -> String {
    let raw = &item.raw;
    let template = rubric(raw.category).summary;

    let key_theft_note = if item.involves_key_theft {
        let kind = item
            .key_theft_type
            .map(|k| k.as_str())
            .unwrap_or("credentials");
        format!("\nThis involves stolen {kind}. Mention this.")
    } else {
        String::new()
    };
    let damage_note = match item.damage_brief.as_deref() {
        Some(d) if !d.is_empty() => format!("\nDamage/Impact: {d}"),
        _ => String::new(),
    };
    let adversary = item
        .adversary
        .map(|a| a.as_str())
        .unwrap_or("unknown");
    let market = raw.category.market_name().unwrap_or("this market");

    template
        .replace("{title}", &raw.title)
        .replace("{source}", &raw.source_name)
        .replace("{content}", content)
        .replace("{key_theft_note}", &key_theft_note)
        .replace("{damage_note}", &damage_note)
        .replace("{adversary}", adversary)
        .replace("{market}", market)
}

pub fn translation_prompt(text: &str) -> String {
    format!(
        "Translate this text to English. Return ONLY the English translation, nothing else.\n\n\
Text: {text}\n\n\
English translation:"
    )
}

pub fn sentiment_prompt(west_text: &str, adversary_text: &str) -> String {
    format!(
        r#"Based on these news headlines, generate a sentiment snapshot.

WESTERN SOURCES HEADLINES:
{west_text}

ADVERSARY-RELATED HEADLINES:
{adversary_text}

Generate exactly this format:

WEST_SENTIMENT: [One word: Optimistic / Cautiously Optimistic / Neutral / Concerned / Alarmed]
WEST_EXPLANATION: [2 sentences explaining the overall mood and key themes]

ADVERSARY_SENTIMENT: [One word: Quiet / Active / Aggressive / Escalating]
ADVERSARY_EXPLANATION: [2 sentences about key activities from China, Russia, Iran, North Korea]

Keep each explanation to 2 sentences maximum."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Adversary, Category, FreshItem, KeyTheftType, RawItem, ScoredItem, SourceType,
    };
    use chrono::Utc;

    fn scored_for(category: Category) -> ScoredItem {
        ScoredItem::degraded(FreshItem {
            raw: RawItem {
                title: "Example headline".to_string(),
                content: "Example body".to_string(),
                url: "https://example.com/a".to_string(),
                source_name: "Example Wire".to_string(),
                source_type: SourceType::Media,
                category,
                published_at: None,
                collected_at: Utc::now(),
            },
            is_fresh: true,
        })
    }

    #[test]
    fn every_category_has_a_rubric_with_the_output_contract() {
        for cat in Category::ALL {
            let r = rubric(cat);
            assert!(r.scoring.contains("{items}"), "{cat} scoring lacks {{items}}");
            assert!(
                r.scoring.contains("Respond ONLY with valid JSON array"),
                "{cat} scoring lacks output-format line"
            );
            assert!(r.summary.contains("{title}"), "{cat} summary lacks {{title}}");
            assert!(r.summary.contains("{content}"), "{cat} summary lacks {{content}}");
        }
    }

    #[test]
    fn scoring_prompt_inlines_the_batch() {
        let p = scoring_prompt(Category::Geopolitics, "[0] Example\nTitle: t\n");
        assert!(p.contains("[0] Example"));
        assert!(!p.contains("{items}"));
    }

    #[test]
    fn cyber_attacks_summary_carries_key_theft_and_damage_notes() {
        let mut item = scored_for(Category::CyberAttacks);
        item.involves_key_theft = true;
        item.key_theft_type = Some(KeyTheftType::ApiKey);
        item.damage_brief = Some("500K records leaked".to_string());
        let p = summary_prompt(&item, "body");
        assert!(p.contains("This involves stolen api_key. Mention this."));
        assert!(p.contains("Damage/Impact: 500K records leaked"));
    }

    #[test]
    fn key_theft_note_defaults_to_credentials() {
        let mut item = scored_for(Category::CyberAttacks);
        item.involves_key_theft = true;
        let p = summary_prompt(&item, "body");
        assert!(p.contains("This involves stolen credentials."));
    }

    #[test]
    fn adversary_and_market_placeholders_render() {
        let mut item = scored_for(Category::AdversaryCyber);
        item.adversary = Some(Adversary::NorthKorea);
        let p = summary_prompt(&item, "body");
        assert!(p.contains("this north_korea cyber activity"));

        let item = scored_for(Category::TargetSouthKorea);
        let p = summary_prompt(&item, "body");
        assert!(p.contains("this South Korea cyber/tech market news"));
        assert!(!p.contains("{market}"));
    }
}
