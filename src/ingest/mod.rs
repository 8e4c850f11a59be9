// src/ingest/mod.rs
//! Feed collector: walks the configured catalog sequentially, parses each
//! feed, normalizes and truncates entries into `RawItem`s and writes them
//! through the store. A failing feed is logged and counted, never fatal.

pub mod feed;

use anyhow::{Context, Result};
use chrono::Utc;
use once_cell::sync::OnceCell;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::sources::FeedSource;
use crate::model::{truncate_chars, RawItem, SourceType};
use crate::store::DigestStore;

const FETCH_TIMEOUT_SECS: u64 = 15;
const ENTRIES_PER_FEED: usize = 15;
const TITLE_MAX_CHARS: usize = 500;
const CONTENT_MAX_CHARS: usize = 5000;

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Outcome counts for one collection run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CollectReport {
    pub sources_ok: usize,
    pub sources_failed: usize,
    pub items_collected: usize,
    pub items_saved: usize,
}

/// Normalize feed text: entity decode, strip tags, tidy quotes, collapse
/// whitespace. Length caps are applied separately per field.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();
    out.trim().to_string()
}

const GOVERNMENT_NAMES: &[&str] = &[
    "cisa", "ncsc", "cert", "bsi", "anssi", "enisa", "nist", "fbi", "acsc", "jpcert", "jvn",
    "ipa", "incd", "krcert", "cccs",
];
const GOVERNMENT_URLS: &[&str] = &[".gov", ".go.jp", ".go.kr", ".gc.ca", "europa.eu", "bund.de"];
const ACADEMIC_NAMES: &[&str] = &["arxiv", "ieee", "acm", "usenix", "iacr"];
const NONPROFIT_NAMES: &[&str] = &[
    "eff", "epic", "fido", "carnegie", "brookings", "rand", "cfr", "chatham",
    "atlantic council", "csis", "belfer", "stimson", "access now",
];
const INDEPENDENT_NAMES: &[&str] = &[
    "krebs", "schneier", "troy hunt", "graham cluley", "risky business", "lawfare",
];
const COMMERCIAL_NAMES: &[&str] = &[
    "crowdstrike", "mandiant", "microsoft", "google", "kaspersky", "sophos", "sentinelone",
    "palo alto", "unit 42", "cisco", "talos", "fortinet", "checkpoint", "check point",
    "trend micro", "cloudflare", "aws", "hashicorp", "proofpoint", "recorded future", "eset",
    "bitdefender", "zscaler", "dragos", "volexity", "red canary", "binary defense", "intezer",
    "huntress", "cybereason", "flashpoint", "intel471", "sekoia", "ahnlab", "thales", "aware",
    "onelogin", "jumpcloud", "curity", "auth0", "lac security", "malwarebytes", "tenable",
    "qualys", "elastic", "sans",
];

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// Classify a feed for dashboard display from its name and url.
pub fn source_type_for(name: &str, url: &str) -> SourceType {
    let name = name.to_lowercase();
    let url = url.to_lowercase();

    if contains_any(&name, GOVERNMENT_NAMES) || contains_any(&url, GOVERNMENT_URLS) {
        return SourceType::Government;
    }
    if contains_any(&name, ACADEMIC_NAMES) {
        return SourceType::Academic;
    }
    if contains_any(&name, NONPROFIT_NAMES) {
        return SourceType::NonProfit;
    }
    if contains_any(&name, INDEPENDENT_NAMES) {
        return SourceType::Independent;
    }
    if contains_any(&name, COMMERCIAL_NAMES) {
        return SourceType::Commercial;
    }
    SourceType::Media
}

fn feed_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
        .build()
        .expect("reqwest client")
}

async fn fetch_feed_content(http: &reqwest::Client, url: &str) -> Result<String> {
    let resp = http
        .get(url)
        .header(
            "Accept",
            "application/rss+xml, application/xml, application/atom+xml, text/xml, */*",
        )
        .header("Accept-Language", "en-US,en;q=0.9")
        .send()
        .await
        .with_context(|| format!("fetching {url}"))?
        .error_for_status()
        .with_context(|| format!("fetching {url}"))?;
    resp.text().await.with_context(|| format!("reading {url}"))
}

/// Turn one source's parsed entries into bounded `RawItem`s.
fn items_from_entries(source: &FeedSource, entries: Vec<feed::FeedEntry>) -> Vec<RawItem> {
    let source_type = source_type_for(&source.name, &source.url);
    let collected_at = Utc::now();

    entries
        .into_iter()
        .take(ENTRIES_PER_FEED)
        .map(|e| RawItem {
            title: truncate_chars(&normalize_text(&e.title), TITLE_MAX_CHARS),
            content: truncate_chars(&normalize_text(&e.content), CONTENT_MAX_CHARS),
            url: e.url,
            source_name: source.name.clone(),
            source_type,
            category: source.category,
            published_at: e.published,
            collected_at,
        })
        .collect()
}

/// Fetch every configured source in sequence and persist what parsed.
pub async fn collect_once<S: DigestStore + ?Sized>(
    store: &mut S,
    sources: &[FeedSource],
) -> Result<CollectReport> {
    let http = feed_http_client();
    let mut report = CollectReport::default();
    let mut all_items: Vec<RawItem> = Vec::new();

    info!(sources = sources.len(), "starting feed collection");

    for source in sources {
        let outcome = async {
            let body = fetch_feed_content(&http, &source.url).await?;
            feed::parse_feed(&body)
        }
        .await;

        match outcome {
            Ok(entries) => {
                let items = items_from_entries(source, entries);
                info!(source = %source.name, items = items.len(), "feed ok");
                report.sources_ok += 1;
                report.items_collected += items.len();
                all_items.extend(items);
            }
            Err(e) => {
                warn!(source = %source.name, error = ?e, "feed failed");
                report.sources_failed += 1;
            }
        }
    }

    if !all_items.is_empty() {
        report.items_saved = store.insert_raw(&all_items).await?;
    }

    info!(
        ok = report.sources_ok,
        failed = report.sources_failed,
        items = report.items_collected,
        saved = report.items_saved,
        "collection finished"
    );
    Ok(report)
}
