//! Flatten a content element into plain prose.
//!
//! Non-prose descendants (scripts, styles, asides, related-story widgets,
//! embeds) are skipped while walking the tree, so the parsed document is
//! never modified.

use super::ExtractedText;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Node, Selector};

static NON_PROSE: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("script, style, aside, noscript, template, .related_stories, .embed-container")
        .unwrap()
});

/// What to flatten.
#[derive(Debug)]
pub enum NormalizeInput<'a> {
    /// A located content container; every text node becomes one line.
    Container(ElementRef<'a>),
    /// Paragraph-like elements; each element becomes one line.
    Paragraphs(Vec<ElementRef<'a>>),
}

/// Whether `element` is markup that never carries article prose.
pub fn is_non_prose(element: &ElementRef<'_>) -> bool {
    NON_PROSE.matches(element)
}

/// Text nodes under `element` in document order, skipping non-prose subtrees.
pub fn prose_strings<'a>(element: ElementRef<'a>) -> Vec<&'a str> {
    let mut out = Vec::new();
    collect_prose(element, &mut out);
    out
}

fn collect_prose<'a>(element: ElementRef<'a>, out: &mut Vec<&'a str>) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push(&**text),
            Node::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    if !is_non_prose(&child_element) {
                        collect_prose(child_element, out);
                    }
                }
            }
            _ => {}
        }
    }
}

/// Flatten `input` into trimmed, newline-joined prose.
///
/// Empty pieces are dropped, so an input with only whitespace text yields an
/// empty [`ExtractedText`].
pub fn normalize(input: NormalizeInput<'_>) -> ExtractedText {
    match input {
        NormalizeInput::Container(container) => {
            ExtractedText::from_pieces(prose_strings(container))
        }
        NormalizeInput::Paragraphs(paragraphs) => ExtractedText::from_pieces(
            paragraphs
                .into_iter()
                .map(|paragraph| prose_strings(paragraph).concat()),
        ),
    }
}
