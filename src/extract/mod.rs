//! Article-body extraction.
//!
//! Raw HTML goes through two steps:
//!
//! 1. **Locate** ([`locator`]): try each
//!    [`ContentPattern`](patterns::ContentPattern) in priority order and keep
//!    the first candidate element that yields prose, falling back to all `<p>`
//!    elements outside boilerplate when none does.
//! 2. **Normalize** ([`normalize`]): walk the candidate, skip non-prose
//!    subtrees, trim every text piece, drop empties and join with newlines.
//!
//! An empty [`ExtractedText`] means nothing usable was found. Callers must
//! check for it explicitly; it is not an error.

pub mod locator;
pub mod normalize;
pub mod patterns;

use crate::config::ExtractionConfig;
use crate::error::ConfigError;
use itertools::Itertools;
use scraper::Html;
use std::fmt;
use tracing::{debug, instrument};

pub use locator::locate;
pub use patterns::{CssPattern, DEFAULT_CONTENT_SELECTORS};

/// Article prose: non-empty trimmed lines joined by `\n`, or the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedText(String);

impl ExtractedText {
    /// Trim each piece, drop empty ones and join the rest with newlines.
    pub fn from_pieces<I, S>(pieces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = pieces
            .into_iter()
            .filter_map(|piece| {
                let trimmed = piece.as_ref().trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
            .join("\n");
        Self(joined.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for ExtractedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which step of the cascade produced the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// The pattern at `index` in the configured list.
    Pattern { index: usize, label: String },
    /// Every `<p>` element in the document.
    ParagraphFallback,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Pattern { label, .. } => write!(f, "pattern '{label}'"),
            Strategy::ParagraphFallback => f.write_str("paragraph fallback"),
        }
    }
}

/// Non-empty article text and how it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub text: ExtractedText,
    pub strategy: Strategy,
}

/// Extracts article text from HTML with a fixed, ordered pattern list.
///
/// The extractor holds no per-document state and can be shared between
/// concurrent article tasks.
#[derive(Debug, Clone)]
pub struct ContentExtractor {
    patterns: Vec<CssPattern>,
}

impl ContentExtractor {
    /// Build an extractor from selectors in priority order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the list is empty or a selector is invalid.
    pub fn new<S: AsRef<str>>(selectors: &[S]) -> Result<Self, ConfigError> {
        Ok(Self {
            patterns: patterns::compile_patterns(selectors)?,
        })
    }

    pub fn from_config(config: &ExtractionConfig) -> Result<Self, ConfigError> {
        Self::new(config.content_selectors.as_slice())
    }

    /// Parse `html` and locate its article text.
    #[instrument(level = "debug", skip_all, fields(html_bytes = html.len()))]
    pub fn extract(&self, html: &str) -> Option<Extraction> {
        let document = Html::parse_document(html);
        let extraction = locate(&document, &self.patterns);
        match &extraction {
            Some(found) => debug!(strategy = %found.strategy, "Article text located"),
            None => debug!("No article text located"),
        }
        extraction
    }

    /// Like [`extract`](Self::extract), collapsing failure into empty text.
    pub fn extract_text(&self, html: &str) -> ExtractedText {
        self.extract(html)
            .map(|extraction| extraction.text)
            .unwrap_or_default()
    }
}
