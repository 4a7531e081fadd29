//! Error types for each stage of the digest pipeline.
//!
//! Each stage fails in its own way and the digest treats them differently:
//! - [`FetchError`]: the article page could not be downloaded (transport failure)
//! - [`SummarizeError`]: the LLM backend is unavailable or returned nothing usable
//! - [`ConfigError`]: the configuration file or a content selector is invalid
//!
//! An empty extraction is not an error. It is represented by an empty
//! [`ExtractedText`](crate::extract::ExtractedText) and checked by the caller.

use thiserror::Error;

/// An HTTP fetch that did not complete.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("request to {url} timed out")]
    Timeout { url: String },
    #[error("request to {url} returned status {status}")]
    Status { url: String, status: u16 },
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    /// Classify a `reqwest` error raised while fetching `url`.
    pub fn from_reqwest(url: &str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else if let Some(status) = source.status() {
            FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            }
        } else {
            FetchError::Request {
                url: url.to_string(),
                source,
            }
        }
    }
}

/// The summarization backend could not produce a summary.
#[derive(Debug, Error)]
pub enum SummarizeError {
    #[error("summarizer unavailable: {0}")]
    Unavailable(String),
    #[error("LLM request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("LLM backend returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("LLM response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("LLM returned an empty completion")]
    EmptyResponse,
}

impl SummarizeError {
    /// Whether retrying the same request could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            SummarizeError::Request(_) => true,
            SummarizeError::Status { status, .. } => *status == 429 || *status >= 500,
            SummarizeError::Unavailable(_)
            | SummarizeError::Decode(_)
            | SummarizeError::EmptyResponse => false,
        }
    }
}

/// Invalid configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid content selector {selector:?}: {reason}")]
    InvalidSelector { selector: String, reason: String },
    #[error("no content selectors configured")]
    NoSelectors,
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_display() {
        let err = FetchError::Status {
            url: "https://example.com/a".to_string(),
            status: 404,
        };
        assert_eq!(
            err.to_string(),
            "request to https://example.com/a returned status 404"
        );
    }

    #[test]
    fn test_invalid_url_keeps_source() {
        let source = url::Url::parse("not a url").unwrap_err();
        let err = FetchError::InvalidUrl {
            url: "not a url".to_string(),
            source,
        };
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidSelector {
            selector: "div[".to_string(),
            reason: "unexpected end of input".to_string(),
        };
        assert!(err.to_string().contains("div["));
    }
}
