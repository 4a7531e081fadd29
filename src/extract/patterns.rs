//! Structural patterns used to find the element holding an article body.
//!
//! Patterns are plain CSS selectors tried in list order. The default list is
//! ordered from the most site-specific layouts to the most generic ones and
//! can be replaced from the configuration file.

use crate::error::ConfigError;
use scraper::{ElementRef, Html, Selector};

/// Default article-body selectors, highest priority first.
pub const DEFAULT_CONTENT_SELECTORS: &[&str] = &[
    "div.content_wrapper",
    "div.article_content",
    "div#contentdata",
    "div.art_content",
    "div.story_page",
    "div.text",
    "article .post-content",
    r#"div[class*="article-body"]"#,
    "div.main-content-body",
    "div.content_detail__body",
    "div.content_text",
    "div.artText",
];

/// A single strategy for locating a candidate content container.
pub trait ContentPattern {
    /// Human-readable name used in logs.
    fn label(&self) -> &str;

    /// Return the first element in document order matching this pattern.
    fn select_first<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>>;
}

/// A [`ContentPattern`] backed by a compiled CSS selector.
#[derive(Debug, Clone)]
pub struct CssPattern {
    source: String,
    selector: Selector,
}

impl CssPattern {
    /// Compile a CSS selector into a pattern.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSelector`] if `source` is not a valid selector.
    pub fn parse(source: &str) -> Result<Self, ConfigError> {
        let selector = Selector::parse(source).map_err(|e| ConfigError::InvalidSelector {
            selector: source.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            source: source.to_string(),
            selector,
        })
    }
}

impl ContentPattern for CssPattern {
    fn label(&self) -> &str {
        &self.source
    }

    fn select_first<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        document.select(&self.selector).next()
    }
}

/// Compile an ordered list of selectors, keeping their order.
///
/// # Errors
///
/// Fails on the first invalid selector, or if the list is empty.
pub fn compile_patterns<S: AsRef<str>>(selectors: &[S]) -> Result<Vec<CssPattern>, ConfigError> {
    if selectors.is_empty() {
        return Err(ConfigError::NoSelectors);
    }
    selectors
        .iter()
        .map(|s| CssPattern::parse(s.as_ref()))
        .collect()
}
