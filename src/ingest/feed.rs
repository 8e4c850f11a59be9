// src/ingest/feed.rs
//! Feed payload parsing: RSS 2.0, RSS 1.0 (RDF) and Atom, via quick-xml
//! serde structs. Date fields are parsed tolerantly; anything unreadable
//! becomes `None` and the collector falls back to the collection timestamp.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use quick_xml::de::from_str;
use serde::Deserialize;

/// One parsed entry, format-agnostic.
#[derive(Debug, Clone)]
pub struct FeedEntry {
    pub title: String,
    pub url: String,
    pub content: String,
    pub published: Option<DateTime<Utc>>,
}

// --- RSS 2.0 / RSS 1.0 ---

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<RssItem>,
}

/// RSS 1.0 (RDF) puts items at the top level instead of under a channel.
#[derive(Debug, Deserialize)]
struct Rdf {
    #[serde(rename = "item", default)]
    items: Vec<RssItem>,
}

#[derive(Debug, Deserialize)]
struct RssItem {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    #[serde(rename = "dc:date")]
    dc_date: Option<String>,
    description: Option<String>,
    #[serde(rename = "content:encoded")]
    content_encoded: Option<String>,
}

// --- Atom ---

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    title: Option<AtomText>,
    #[serde(rename = "link", default)]
    links: Vec<AtomLink>,
    published: Option<String>,
    updated: Option<String>,
    summary: Option<AtomText>,
    content: Option<AtomText>,
}

/// Atom text constructs carry a `type` attribute; `$text` captures the body
/// either way.
#[derive(Debug, Deserialize)]
struct AtomText {
    #[serde(rename = "$text")]
    value: Option<String>,
}

impl AtomText {
    fn into_inner(self) -> Option<String> {
        self.value
    }
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href")]
    href: Option<String>,
}

/// RFC2822 ("Tue, 01 Jul 2025 09:00:00 GMT") or RFC3339; None otherwise.
fn parse_feed_date(ts: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(ts)
        .or_else(|_| DateTime::parse_from_rfc3339(ts))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn from_rss_item(it: RssItem) -> FeedEntry {
    // Full-text body beats the teaser when both are present.
    let content = it
        .content_encoded
        .or(it.description)
        .unwrap_or_default();
    FeedEntry {
        title: it.title.unwrap_or_else(|| "No title".to_string()),
        url: it.link.unwrap_or_default(),
        content,
        published: it
            .pub_date
            .as_deref()
            .or(it.dc_date.as_deref())
            .and_then(parse_feed_date),
    }
}

fn from_atom_entry(e: AtomEntry) -> FeedEntry {
    let content = e
        .content
        .and_then(AtomText::into_inner)
        .or_else(|| e.summary.and_then(AtomText::into_inner))
        .unwrap_or_default();
    FeedEntry {
        title: e
            .title
            .and_then(AtomText::into_inner)
            .unwrap_or_else(|| "No title".to_string()),
        url: e
            .links
            .into_iter()
            .find_map(|l| l.href)
            .unwrap_or_default(),
        content,
        published: e
            .published
            .as_deref()
            .or(e.updated.as_deref())
            .and_then(parse_feed_date),
    }
}

/// Parse a feed body, sniffing RSS 2.0 first, then RDF, then Atom.
pub fn parse_feed(xml: &str) -> Result<Vec<FeedEntry>> {
    if let Ok(rss) = from_str::<Rss>(xml) {
        if !rss.channel.items.is_empty() {
            return Ok(rss.channel.items.into_iter().map(from_rss_item).collect());
        }
    }
    if let Ok(rdf) = from_str::<Rdf>(xml) {
        if !rdf.items.is_empty() {
            return Ok(rdf.items.into_iter().map(from_rss_item).collect());
        }
    }
    if let Ok(atom) = from_str::<AtomFeed>(xml) {
        if !atom.entries.is_empty() {
            return Ok(atom.entries.into_iter().map(from_atom_entry).collect());
        }
    }
    Err(anyhow!("unrecognized or empty feed document"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS_FIXTURE: &str = r#"<?xml version="1.0"?>
<rss version="2.0" xmlns:content="http://purl.org/rss/1.0/modules/content/">
  <channel>
    <title>Example Security Feed</title>
    <item>
      <title>Major breach at example corp</title>
      <link>https://example.com/breach</link>
      <pubDate>Tue, 01 Jul 2025 09:00:00 GMT</pubDate>
      <description>Short teaser.</description>
      <content:encoded>Full article body with details.</content:encoded>
    </item>
    <item>
      <title>Second story</title>
      <link>https://example.com/second</link>
      <description>Teaser only.</description>
    </item>
  </channel>
</rss>"#;

    const ATOM_FIXTURE: &str = r#"<?xml version="1.0"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Example Atom Feed</title>
  <entry>
    <title>Atom entry title</title>
    <link href="https://example.com/atom-entry"/>
    <updated>2025-07-01T09:00:00Z</updated>
    <summary>Atom summary text.</summary>
  </entry>
</feed>"#;

    #[test]
    fn rss_parses_and_prefers_encoded_content() {
        let entries = parse_feed(RSS_FIXTURE).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "Major breach at example corp");
        assert_eq!(entries[0].content, "Full article body with details.");
        assert!(entries[0].published.is_some());
        assert_eq!(entries[1].content, "Teaser only.");
        assert!(entries[1].published.is_none());
    }

    #[test]
    fn atom_parses_link_and_updated() {
        let entries = parse_feed(ATOM_FIXTURE).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].url, "https://example.com/atom-entry");
        assert!(entries[0].published.is_some());
        assert_eq!(entries[0].content, "Atom summary text.");
    }

    #[test]
    fn garbage_is_an_error_not_a_panic() {
        assert!(parse_feed("not xml at all").is_err());
        assert!(parse_feed("<rss><channel></channel></rss>").is_err());
    }

    #[test]
    fn bad_dates_become_none() {
        assert!(parse_feed_date("yesterday-ish").is_none());
        assert!(parse_feed_date("Tue, 01 Jul 2025 09:00:00 GMT").is_some());
        assert!(parse_feed_date("2025-07-01T09:00:00+02:00").is_some());
    }
}
