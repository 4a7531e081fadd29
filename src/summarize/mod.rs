//! Article summarization on top of an [`AskAsync`] backend.
//!
//! Article text is split into overlapping chunks and the chunks are stuffed
//! back into a single prompt. When the stuffed text would not fit in
//! `max_input_chars`, chunks are grouped into batches that do, each batch is
//! summarized, and the partial summaries are summarized once more.

pub mod splitter;

use crate::api::{AskAsync, ChatClient, RetryAsk};
use crate::config::{LlmConfig, SummaryConfig};
use crate::error::SummarizeError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

pub use splitter::TextSplitter;

static EXCESS_NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

const CHUNK_JOINER: &str = "\n\n";

/// Build the summarization prompt for `text`.
pub fn summary_prompt(text: &str, max_words: usize) -> String {
    format!(
        "Write a concise summary of the following text, no more than {max_words} words.\n\
         Include the main points and key details.\n\
         \n\
         Text:\n\
         {text}\n"
    )
}

/// Produces bounded-length summaries of article text.
#[derive(Debug)]
pub struct Summarizer<A> {
    ask: A,
    splitter: TextSplitter,
    max_words: usize,
    max_input_chars: usize,
}

impl Summarizer<RetryAsk<ChatClient>> {
    /// Build a summarizer backed by the configured chat completions API.
    ///
    /// # Errors
    ///
    /// [`SummarizeError::Unavailable`] when no API key is configured or the
    /// HTTP client cannot be built.
    pub fn from_config(llm: &LlmConfig, summary: &SummaryConfig) -> Result<Self, SummarizeError> {
        let api_key = llm
            .api_key
            .as_deref()
            .ok_or_else(|| SummarizeError::Unavailable("no API key configured".into()))?;
        let client = ChatClient::new(llm, api_key)?;
        let ask = RetryAsk::new(
            client,
            llm.max_retries,
            Duration::from_millis(llm.base_delay_ms),
        );
        info!(model = %llm.model, api_base = %llm.api_base, "LLM client initialized");
        Ok(Self::new(ask, summary))
    }
}

impl<A> Summarizer<A>
where
    A: AskAsync<Response = String>,
{
    pub fn new(ask: A, config: &SummaryConfig) -> Self {
        Self {
            ask,
            splitter: TextSplitter::new(config.chunk_size, config.chunk_overlap),
            max_words: config.max_words,
            max_input_chars: config.max_input_chars.max(config.chunk_size),
        }
    }

    #[cfg(test)]
    pub fn backend(&self) -> &A {
        &self.ask
    }

    /// Summarize `text` in at most the configured number of words.
    ///
    /// # Errors
    ///
    /// Any backend failure, or [`SummarizeError::EmptyResponse`] if the text
    /// is blank or the model returns nothing.
    #[instrument(level = "info", skip_all, fields(chars = text.len()))]
    pub async fn summarize(&self, text: &str) -> Result<String, SummarizeError> {
        let chunks = self.splitter.split(text);
        if chunks.is_empty() {
            return Err(SummarizeError::EmptyResponse);
        }

        let mut inputs = self.batches(&chunks);
        debug!(chunks = chunks.len(), batches = inputs.len(), "Split article text");

        loop {
            if inputs.len() == 1 {
                return self.summarize_once(&inputs[0]).await;
            }

            let mut partials = Vec::with_capacity(inputs.len());
            for (i, input) in inputs.iter().enumerate() {
                debug!(batch = i, chars = input.len(), "Summarizing batch");
                partials.push(self.summarize_once(input).await?);
            }

            let regrouped = self.batches(&partials);
            if regrouped.len() >= inputs.len() {
                // Partial summaries are as long as their inputs; stop reducing.
                warn!(partials = partials.len(), "Partial summaries do not shrink; clipping");
                let clipped: String = partials
                    .join(CHUNK_JOINER)
                    .chars()
                    .take(self.max_input_chars)
                    .collect();
                return self.summarize_once(&clipped).await;
            }
            info!(
                partials = partials.len(),
                groups = regrouped.len(),
                "Combining partial summaries"
            );
            inputs = regrouped;
        }
    }

    async fn summarize_once(&self, text: &str) -> Result<String, SummarizeError> {
        let reply = self.ask.ask(&summary_prompt(text, self.max_words)).await?;
        let cleaned = EXCESS_NEWLINES.replace_all(reply.trim(), "\n\n").into_owned();
        if cleaned.is_empty() {
            return Err(SummarizeError::EmptyResponse);
        }
        Ok(cleaned)
    }

    /// Join chunks into stuffed texts that each fit in `max_input_chars`.
    fn batches(&self, chunks: &[String]) -> Vec<String> {
        let mut batches = Vec::new();
        let mut current = String::new();
        let mut current_chars = 0usize;

        for chunk in chunks {
            let chunk_chars = chunk.chars().count();
            let needed = if current.is_empty() {
                chunk_chars
            } else {
                current_chars + CHUNK_JOINER.len() + chunk_chars
            };
            if needed > self.max_input_chars && !current.is_empty() {
                batches.push(std::mem::take(&mut current));
                current_chars = 0;
            }
            if !current.is_empty() {
                current.push_str(CHUNK_JOINER);
                current_chars += CHUNK_JOINER.len();
            }
            current.push_str(chunk);
            current_chars += chunk_chars;
        }
        if !current.is_empty() {
            batches.push(current);
        }
        batches
    }
}
