//! Locate the article body with an ordered cascade of patterns.

use super::normalize::{NormalizeInput, is_non_prose, normalize};
use super::patterns::ContentPattern;
use super::{Extraction, Strategy};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

static PARAGRAPHS: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());

/// Find the article text in `document`.
///
/// Patterns are tried in order. The first one whose first match normalizes to
/// non-empty text wins and no later pattern is queried. A pattern that matches
/// only boilerplate is skipped. If every pattern fails, all `<p>` elements are
/// flattened instead. Returns `None` when that is empty too.
pub fn locate<P: ContentPattern>(document: &Html, patterns: &[P]) -> Option<Extraction> {
    for (index, pattern) in patterns.iter().enumerate() {
        let Some(candidate) = pattern.select_first(document) else {
            debug!(pattern = pattern.label(), "Pattern matched no element");
            continue;
        };

        let text = normalize(NormalizeInput::Container(candidate));
        if text.is_empty() {
            debug!(pattern = pattern.label(), "Pattern matched an element without prose");
            continue;
        }

        debug!(
            pattern = pattern.label(),
            index,
            bytes = text.len(),
            "Extracted content with pattern"
        );
        return Some(Extraction {
            text,
            strategy: Strategy::Pattern {
                index,
                label: pattern.label().to_string(),
            },
        });
    }

    let paragraphs: Vec<_> = document
        .select(&PARAGRAPHS)
        .filter(|paragraph| !inside_non_prose(paragraph))
        .collect();
    if paragraphs.is_empty() {
        debug!("No paragraph tags found for fallback extraction");
        return None;
    }

    let text = normalize(NormalizeInput::Paragraphs(paragraphs));
    if text.is_empty() {
        debug!("Paragraph fallback yielded no prose");
        return None;
    }

    debug!(bytes = text.len(), "Extracted content with paragraph fallback");
    Some(Extraction {
        text,
        strategy: Strategy::ParagraphFallback,
    })
}

/// Whether `element` or one of its ancestors never carries article prose.
fn inside_non_prose(element: &ElementRef<'_>) -> bool {
    is_non_prose(element)
        || element
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|ancestor| is_non_prose(&ancestor))
}
