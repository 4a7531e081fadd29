//! Data models for the catalog and the digest it produces.
//!
//! - [`CatalogEntry`]: a candidate article (title and URL)
//! - [`ArticleDigest`]: the outcome for one selected article
//! - [`Digest`]: every selected article for one run, in catalog order

use serde::{Deserialize, Serialize};

/// Placeholder shown when the article page could not be downloaded.
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch article content.";
/// Placeholder shown when the page held no extractable prose.
pub const EXTRACTION_EMPTY_MESSAGE: &str = "Failed to extract article content.";
/// Placeholder shown when no summary could be generated.
pub const SUMMARY_FAILED_MESSAGE: &str = "Failed to generate summary.";

/// A candidate article that keyword preferences are matched against.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CatalogEntry {
    pub title: String,
    pub url: String,
}

/// What happened to a selected article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArticleStatus {
    Summarized,
    FetchFailed,
    ExtractionEmpty,
    SummarizationUnavailable,
}

impl ArticleStatus {
    /// User-facing placeholder for a failed article, `None` on success.
    pub fn placeholder(self) -> Option<&'static str> {
        match self {
            ArticleStatus::Summarized => None,
            ArticleStatus::FetchFailed => Some(FETCH_FAILED_MESSAGE),
            ArticleStatus::ExtractionEmpty => Some(EXTRACTION_EMPTY_MESSAGE),
            ArticleStatus::SummarizationUnavailable => Some(SUMMARY_FAILED_MESSAGE),
        }
    }
}

/// One slot of the digest.
///
/// `summary` holds either the generated summary or the placeholder for the
/// failure recorded in `status`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ArticleDigest {
    pub title: String,
    pub url: String,
    pub status: ArticleStatus,
    pub summary: String,
}

impl ArticleDigest {
    pub fn summarized(entry: &CatalogEntry, summary: String) -> Self {
        Self {
            title: entry.title.trim().to_string(),
            url: entry.url.clone(),
            status: ArticleStatus::Summarized,
            summary,
        }
    }

    pub fn failed(entry: &CatalogEntry, status: ArticleStatus) -> Self {
        Self {
            title: entry.title.trim().to_string(),
            url: entry.url.clone(),
            status,
            summary: status
                .placeholder()
                .unwrap_or(SUMMARY_FAILED_MESSAGE)
                .to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ArticleStatus::Summarized
    }

    /// Extract the domain name (before .com/.org/etc) from the article URL.
    /// For example: "https://www.moneycontrol.com/technology/x" -> "moneycontrol"
    pub fn source_tag(&self) -> Option<String> {
        let parsed = url::Url::parse(&self.url).ok()?;
        let host = parsed.host_str()?;
        let parts: Vec<&str> = host.split('.').collect();
        if parts.len() >= 2 {
            Some(parts[parts.len() - 2].to_string())
        } else {
            None
        }
    }
}

/// All article outcomes for one run.
///
/// `time_of_day` names the edition: "morning" (00:00-08:00), "afternoon"
/// (08:00-16:00) or "evening" (16:00-24:00).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Digest {
    /// Date of the run in `YYYY-MM-DD` format.
    pub local_date: String,
    pub time_of_day: String,
    pub local_time: String,
    /// Keywords the articles were selected with.
    pub preferences: Vec<String>,
    pub articles: Vec<ArticleDigest>,
}

impl Digest {
    pub fn successful(&self) -> usize {
        self.articles.iter().filter(|a| a.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.articles.len() - self.successful()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(url: &str) -> CatalogEntry {
        CatalogEntry {
            title: "  Stock Market hits record ".to_string(),
            url: url.to_string(),
        }
    }

    #[test]
    fn test_failed_uses_placeholder() {
        let article =
            ArticleDigest::failed(&entry("https://example.com/a"), ArticleStatus::FetchFailed);
        assert_eq!(article.summary, "Failed to fetch article content.");
        assert_eq!(article.title, "Stock Market hits record");
        assert!(!article.is_success());
    }

    #[test]
    fn test_placeholders_are_distinct() {
        let fetch = ArticleStatus::FetchFailed.placeholder();
        let empty = ArticleStatus::ExtractionEmpty.placeholder();
        let summary = ArticleStatus::SummarizationUnavailable.placeholder();
        assert_ne!(fetch, empty);
        assert_ne!(empty, summary);
        assert_eq!(ArticleStatus::Summarized.placeholder(), None);
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&ArticleStatus::SummarizationUnavailable).unwrap();
        assert_eq!(json, "\"summarization_unavailable\"");
    }

    #[test]
    fn test_digest_serialization() {
        let digest = Digest {
            local_date: "2026-10-18".to_string(),
            time_of_day: "evening".to_string(),
            local_time: "20:30:00".to_string(),
            preferences: vec!["AI".to_string()],
            articles: vec![ArticleDigest::summarized(
                &entry("https://example.com/a"),
                "Summary".to_string(),
            )],
        };

        let json = serde_json::to_string(&digest).unwrap();
        assert!(json.contains("2026-10-18"));
        assert!(json.contains("\"status\":\"summarized\""));

        let back: Digest = serde_json::from_str(&json).unwrap();
        assert_eq!(back.articles, digest.articles);
        assert_eq!(back.successful(), 1);
        assert_eq!(back.failed(), 0);
    }

    #[test]
    fn test_source_tag() {
        let article = ArticleDigest::summarized(
            &entry("https://www.moneycontrol.com/technology/article-1.html"),
            String::new(),
        );
        assert_eq!(article.source_tag(), Some("moneycontrol".to_string()));
    }

    #[test]
    fn test_source_tag_invalid_url() {
        let article = ArticleDigest::failed(&entry("not a url"), ArticleStatus::FetchFailed);
        assert_eq!(article.source_tag(), None);
    }

    #[test]
    fn test_source_tag_single_label_host() {
        let article =
            ArticleDigest::failed(&entry("http://localhost:8080/a"), ArticleStatus::FetchFailed);
        assert_eq!(article.source_tag(), None);
    }
}
