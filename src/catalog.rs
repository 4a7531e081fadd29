//! Article catalog and keyword selection.
//!
//! The catalog is the static list from the configuration plus the items of
//! any configured RSS/Atom feeds. Preferences select entries whose title
//! contains one of the keywords, ignoring case.

use crate::fetch::FetchHtml;
use crate::models::CatalogEntry;
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use tracing::{debug, info, instrument, warn};

/// Entries whose title contains any keyword as a case-insensitive substring.
///
/// Keywords are trimmed and blank ones ignored. Catalog order is preserved.
pub fn filter_by_keywords(preferences: &[String], catalog: &[CatalogEntry]) -> Vec<CatalogEntry> {
    let keywords: Vec<String> = preferences
        .iter()
        .map(|keyword| keyword.trim().to_lowercase())
        .filter(|keyword| !keyword.is_empty())
        .unique()
        .collect();

    catalog
        .iter()
        .filter(|entry| {
            let title = entry.title.to_lowercase();
            keywords.iter().any(|keyword| title.contains(keyword.as_str()))
        })
        .cloned()
        .collect()
}

/// Combine the static catalog with feed items, dropping repeated URLs.
///
/// A feed that fails to download or parse is logged and skipped.
#[instrument(
    level = "info",
    skip_all,
    fields(static_entries = static_entries.len(), feeds = feeds.len())
)]
pub async fn assemble_catalog<F: FetchHtml>(
    fetcher: &F,
    static_entries: &[CatalogEntry],
    feeds: &[String],
) -> Vec<CatalogEntry> {
    let feed_entries: Vec<Vec<CatalogEntry>> = stream::iter(feeds)
        .then(|feed_url| async move {
            match fetcher.fetch_html(feed_url).await {
                Ok(xml) => match parse_feed_entries(&xml) {
                    Ok(entries) => {
                        debug!(%feed_url, count = entries.len(), "Parsed feed");
                        entries
                    }
                    Err(e) => {
                        warn!(%feed_url, error = %e, "Feed could not be parsed; skipping");
                        Vec::new()
                    }
                },
                Err(e) => {
                    warn!(%feed_url, error = %e, "Feed fetch failed; skipping");
                    Vec::new()
                }
            }
        })
        .collect()
        .await;

    let catalog: Vec<CatalogEntry> = static_entries
        .iter()
        .cloned()
        .chain(feed_entries.into_iter().flatten())
        .unique_by(|entry| entry.url.clone())
        .collect();

    info!(count = catalog.len(), "Assembled article catalog");
    catalog
}

#[derive(Clone, Copy)]
enum Field {
    Title,
    Link,
}

/// Parse `(title, link)` pairs from an RSS 2.0 or Atom document.
///
/// Items missing either a title or a link are skipped.
pub fn parse_feed_entries(xml: &str) -> Result<Vec<CatalogEntry>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut entries = Vec::new();
    let mut in_item = false;
    let mut field: Option<Field> = None;
    let mut title = String::new();
    let mut link = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => match local_name(e.name().as_ref()) {
                b"item" | b"entry" => {
                    in_item = true;
                    title.clear();
                    link.clear();
                }
                b"title" if in_item => field = Some(Field::Title),
                b"link" if in_item => {
                    field = Some(Field::Link);
                    if let Some(href) = href_attr(&e) {
                        link = href;
                    }
                }
                _ => {}
            },
            Event::Empty(e) => {
                // Atom: <link rel="alternate" href="..."/>
                if in_item && local_name(e.name().as_ref()) == b"link" && link.is_empty() {
                    if let Some(href) = href_attr(&e) {
                        link = href;
                    }
                }
            }
            Event::Text(t) => {
                if let Some(f) = field {
                    push_field(f, &String::from_utf8_lossy(t.as_ref()), &mut title, &mut link);
                }
            }
            Event::CData(c) => {
                if let Some(f) = field {
                    push_field(f, &String::from_utf8_lossy(&c), &mut title, &mut link);
                }
            }
            Event::GeneralRef(r) => {
                if let Some(f) = field {
                    if let Some(resolved) = resolve_entity(&String::from_utf8_lossy(r.as_ref())) {
                        push_field(f, &resolved.to_string(), &mut title, &mut link);
                    }
                }
            }
            Event::End(e) => match local_name(e.name().as_ref()) {
                b"title" | b"link" => field = None,
                b"item" | b"entry" => {
                    in_item = false;
                    let clean_title = title.split_whitespace().join(" ");
                    let clean_link = link.trim();
                    if !clean_title.is_empty() && !clean_link.is_empty() {
                        entries.push(CatalogEntry {
                            title: clean_title,
                            url: clean_link.to_string(),
                        });
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(entries)
}

fn push_field(field: Field, text: &str, title: &mut String, link: &mut String) {
    match field {
        Field::Title => title.push_str(text),
        Field::Link => link.push_str(text),
    }
}

fn local_name(name: &[u8]) -> &[u8] {
    match name.iter().rposition(|&b| b == b':') {
        Some(pos) => &name[pos + 1..],
        None => name,
    }
}

fn href_attr(element: &BytesStart<'_>) -> Option<String> {
    element
        .attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == b"href")
        .map(|attr| String::from_utf8_lossy(&attr.value).into_owned())
}

fn resolve_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = entity.strip_prefix('#')?;
            let value = match code.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse().ok()?,
            };
            char::from_u32(value)
        }
    }
}
