//! LLM API interaction with exponential backoff retry logic.
//!
//! This module talks to an OpenAI-compatible chat completions endpoint
//! (Groq by default). It includes automatic retry logic with exponential
//! backoff and jitter to handle transient failures gracefully.
//!
//! # Architecture
//!
//! The module uses a trait-based design for flexibility:
//! - [`AskAsync`]: Core trait defining async LLM interaction
//! - [`ChatClient`]: Sends a single-message chat completion request
//! - [`RetryAsk`]: Decorator that adds retry logic to any `AskAsync` implementation
//!
//! # Retry Strategy
//!
//! - Configurable number of retries (3 by default)
//! - Exponential backoff starting at the configured base delay
//! - Maximum delay capped at 30 seconds
//! - Random jitter (0-250ms) added to prevent thundering herd
//! - Errors that cannot succeed on retry (bad key, malformed reply) fail immediately

use crate::config::LlmConfig;
use crate::error::SummarizeError;
use rand::{Rng, rng};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration as StdDuration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, instrument, warn};

/// Trait for async LLM interaction.
///
/// Implementors of this trait can send text to an LLM and receive a response.
/// This abstraction allows for different LLM backends or decorators (like retry logic).
pub trait AskAsync {
    /// The type of response returned by the LLM.
    type Response;

    /// Send text to the LLM and receive a response.
    async fn ask(&self, text: &str) -> Result<Self::Response, SummarizeError>;
}

/// Wrapper that adds exponential backoff retry logic to any [`AskAsync`] implementation.
///
/// The delay between retries follows this formula:
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
/// ```
pub struct RetryAsk<T> {
    /// The underlying LLM client to wrap.
    inner: T,
    /// Maximum number of retry attempts before giving up.
    max_retries: usize,
    /// Initial delay between retries (doubles with each attempt).
    base_delay: StdDuration,
    /// Maximum delay cap to prevent excessive waiting.
    max_delay: StdDuration,
}

impl<T> RetryAsk<T>
where
    T: AskAsync,
{
    /// Create a new retry wrapper around an existing [`AskAsync`] implementation.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let client = ChatClient::new(&llm_config, &api_key)?;
    /// let retry_client = RetryAsk::new(client, 3, Duration::from_secs(1));
    /// ```
    pub fn new(inner: T, max_retries: usize, base_delay: StdDuration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: StdDuration::from_secs(30),
        }
    }

    #[cfg(test)]
    pub fn inner(&self) -> &T {
        &self.inner
    }
}

impl<T> fmt::Debug for RetryAsk<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryAsk")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T> AskAsync for RetryAsk<T>
where
    T: AskAsync + fmt::Debug,
{
    type Response = T::Response;

    #[instrument(level = "info", skip_all)]
    async fn ask(&self, text: &str) -> Result<Self::Response, SummarizeError> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            let attempt_t0 = Instant::now();
            match self.inner.ask(text).await {
                Ok(resp) => {
                    return Ok(resp);
                }
                Err(e) => {
                    attempt += 1;
                    let attempt_dt = attempt_t0.elapsed();
                    let total_dt = total_t0.elapsed();

                    if !e.is_retryable() {
                        error!(attempt, error = %e, "ask() failed with a permanent error");
                        return Err(e);
                    }

                    if attempt > self.max_retries {
                        error!(
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_attempt = attempt_dt.as_millis() as u64,
                            elapsed_ms_total = total_dt.as_millis() as u64,
                            error = %e,
                            "ask() exhausted retries"
                        );
                        return Err(e);
                    }

                    // backoff calc
                    let shift = u32::try_from(attempt - 1).unwrap_or(u32::MAX).min(16);
                    let mut delay = self.base_delay.saturating_mul(1 << shift);
                    if delay > self.max_delay {
                        delay = self.max_delay;
                    }
                    let jitter_ms: u64 = rng().random_range(0..=250);
                    let delay = delay + StdDuration::from_millis(jitter_ms);

                    warn!(
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_attempt = attempt_dt.as_millis() as u64,
                        elapsed_ms_total = total_dt.as_millis() as u64,
                        ?delay,
                        error = %e,
                        "ask() attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// Client for `POST {api_base}/chat/completions`.
///
/// Each call sends the text as a single user message and returns the first
/// choice's content.
pub struct ChatClient {
    http: Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl ChatClient {
    /// Build a client for `config`, authenticating with `api_key`.
    ///
    /// # Errors
    ///
    /// [`SummarizeError::Unavailable`] if the key is blank or the HTTP client
    /// cannot be created.
    pub fn new(config: &LlmConfig, api_key: &str) -> Result<Self, SummarizeError> {
        if api_key.trim().is_empty() {
            return Err(SummarizeError::Unavailable("no API key configured".into()));
        }
        let http = Client::builder()
            .timeout(StdDuration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SummarizeError::Unavailable(format!("HTTP client: {e}")))?;
        Ok(Self {
            http,
            endpoint: format!("{}/chat/completions", config.api_base.trim_end_matches('/')),
            api_key: api_key.trim().to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }
}

impl fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatClient")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl AskAsync for ChatClient {
    type Response = String;

    #[instrument(level = "info", skip_all, fields(model = %self.model))]
    async fn ask(&self, text: &str) -> Result<Self::Response, SummarizeError> {
        let t0 = Instant::now();
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: text,
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let dt = t0.elapsed();

        if !status.is_success() {
            warn!(elapsed_ms = dt.as_millis() as u64, status = status.as_u16(), "API call failed");
            return Err(SummarizeError::Status {
                status: status.as_u16(),
                body: crate::utils::truncate_for_log(&body, 300),
            });
        }

        let parsed: ChatResponse = serde_json::from_str(&body)?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(SummarizeError::EmptyResponse)?;

        debug!(elapsed_ms = dt.as_millis() as u64, chars = content.len(), "API call succeeded");
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::cell::Cell;

    #[derive(Debug)]
    struct Flaky {
        failures_before_success: usize,
        calls: Cell<usize>,
        status: u16,
    }

    impl AskAsync for Flaky {
        type Response = String;

        async fn ask(&self, text: &str) -> Result<String, SummarizeError> {
            let call = self.calls.get() + 1;
            self.calls.set(call);
            if call <= self.failures_before_success {
                Err(SummarizeError::Status {
                    status: self.status,
                    body: String::new(),
                })
            } else {
                Ok(format!("ok: {text}"))
            }
        }
    }

    fn flaky(failures_before_success: usize, status: u16) -> Flaky {
        Flaky {
            failures_before_success,
            calls: Cell::new(0),
            status,
        }
    }

    fn config_for(server: &MockServer) -> LlmConfig {
        LlmConfig {
            api_base: server.url("/openai/v1"),
            ..LlmConfig::default()
        }
    }

    #[tokio::test]
    async fn test_retry_recovers_from_transient_errors() {
        let api = RetryAsk::new(flaky(2, 503), 3, StdDuration::from_millis(1));
        let result = api.ask("hello").await.unwrap();
        assert_eq!(result, "ok: hello");
        assert_eq!(api.inner().calls.get(), 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_max_retries() {
        let api = RetryAsk::new(flaky(10, 429), 2, StdDuration::from_millis(1));
        let err = api.ask("hello").await.unwrap_err();
        assert!(matches!(err, SummarizeError::Status { status: 429, .. }));
        assert_eq!(api.inner().calls.get(), 3);
    }

    #[tokio::test]
    async fn test_retry_stops_on_permanent_error() {
        let api = RetryAsk::new(flaky(10, 401), 5, StdDuration::from_millis(1));
        assert!(api.ask("hello").await.is_err());
        assert_eq!(api.inner().calls.get(), 1);
    }

    #[test]
    fn test_chat_client_requires_api_key() {
        let err = ChatClient::new(&LlmConfig::default(), "  ").unwrap_err();
        assert!(matches!(err, SummarizeError::Unavailable(_)));
    }

    #[test]
    fn test_chat_client_debug_hides_key() {
        let client = ChatClient::new(&LlmConfig::default(), "gsk_secret").unwrap();
        assert!(!format!("{client:?}").contains("gsk_secret"));
    }

    #[tokio::test]
    async fn test_chat_client_sends_completion_request() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/openai/v1/chat/completions")
                    .header("authorization", "Bearer gsk_test")
                    .json_body(json!({
                        "model": "llama-3.3-70b-versatile",
                        "messages": [{"role": "user", "content": "Summarize me"}],
                        "temperature": 0.7,
                        "max_tokens": 500
                    }));
                then.status(200).json_body(json!({
                    "id": "chatcmpl-1",
                    "choices": [{"index": 0, "message": {"role": "assistant", "content": "  A summary.  "}}]
                }));
            })
            .await;

        let client = ChatClient::new(&config_for(&server), "gsk_test").unwrap();
        let reply = client.ask("Summarize me").await.unwrap();

        mock.assert_async().await;
        assert_eq!(reply, "A summary.");
    }

    #[tokio::test]
    async fn test_chat_client_maps_error_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/openai/v1/chat/completions");
                then.status(401).body(r#"{"error":{"message":"Invalid API Key"}}"#);
            })
            .await;

        let client = ChatClient::new(&config_for(&server), "bad").unwrap();
        let err = client.ask("x").await.unwrap_err();
        assert!(matches!(err, SummarizeError::Status { status: 401, .. }));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_chat_client_empty_completion() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/openai/v1/chat/completions");
                then.status(200)
                    .json_body(json!({"choices": [{"message": {"content": "   "}}]}));
            })
            .await;

        let client = ChatClient::new(&config_for(&server), "gsk_test").unwrap();
        let err = client.ask("x").await.unwrap_err();
        assert!(matches!(err, SummarizeError::EmptyResponse));
    }
}
