//! The per-article pipeline and the batch that builds a [`Digest`].
//!
//! Each selected article goes through fetch → extract → summarize. A failure
//! at any step only affects that article: its slot in the digest records the
//! failure and a placeholder message, and the batch carries on.

use crate::api::AskAsync;
use crate::error::FetchError;
use crate::extract::{ContentExtractor, ExtractedText};
use crate::fetch::FetchHtml;
use crate::models::{ArticleDigest, ArticleStatus, CatalogEntry, Digest};
use crate::summarize::Summarizer;
use crate::utils::edition_for;
use chrono::{Local, NaiveDateTime};
use futures::stream::{self, StreamExt};
use tracing::{error, info, instrument, warn};

/// Collaborators shared by every article in a run.
pub struct Pipeline<'a, F, A> {
    pub fetcher: &'a F,
    pub extractor: &'a ContentExtractor,
    /// `None` when the summarizer could not be initialized.
    pub summarizer: Option<&'a Summarizer<A>>,
}

impl<'a, F, A> Pipeline<'a, F, A>
where
    F: FetchHtml,
    A: AskAsync<Response = String>,
{
    /// Fetch `url` and extract its article text.
    ///
    /// A transport failure is an error; an empty result means the page was
    /// fetched but held no usable prose.
    #[instrument(level = "info", skip_all, fields(%url))]
    pub async fn extract_article(&self, url: &str) -> Result<ExtractedText, FetchError> {
        let html = self.fetcher.fetch_html(url).await?;
        let text = self.extractor.extract_text(&html);
        if text.is_empty() {
            warn!("Could not extract main article content");
        } else {
            info!(bytes = text.len(), "Extracted article content");
        }
        Ok(text)
    }

    /// Produce the digest slot for one catalog entry.
    #[instrument(level = "info", skip_all, fields(url = %entry.url))]
    pub async fn summarize_entry(&self, entry: &CatalogEntry) -> ArticleDigest {
        let text = match self.extract_article(&entry.url).await {
            Ok(text) => text,
            Err(e) => {
                error!(error = %e, "Article fetch failed");
                return ArticleDigest::failed(entry, ArticleStatus::FetchFailed);
            }
        };
        if text.is_empty() {
            return ArticleDigest::failed(entry, ArticleStatus::ExtractionEmpty);
        }

        let Some(summarizer) = self.summarizer else {
            error!("LLM is not initialized; cannot summarize");
            return ArticleDigest::failed(entry, ArticleStatus::SummarizationUnavailable);
        };

        match summarizer.summarize(text.as_str()).await {
            Ok(summary) => {
                info!(chars = summary.len(), "Summarized article");
                ArticleDigest::summarized(entry, summary)
            }
            Err(e) => {
                error!(error = %e, "Error summarizing text");
                ArticleDigest::failed(entry, ArticleStatus::SummarizationUnavailable)
            }
        }
    }

    /// Process `entries` with at most `concurrency` articles in flight.
    ///
    /// Articles keep their catalog order in the result.
    #[instrument(
        level = "info",
        skip_all,
        fields(articles = entries.len(), concurrency = concurrency)
    )]
    pub async fn run(
        &self,
        preferences: &[String],
        entries: &[CatalogEntry],
        concurrency: usize,
    ) -> Digest {
        let started = Local::now().naive_local();
        let articles: Vec<ArticleDigest> = stream::iter(entries)
            .map(|entry| self.summarize_entry(entry))
            .buffered(concurrency.max(1))
            .collect()
            .await;

        let digest = assemble_digest(started, preferences, articles);
        info!(
            total = digest.articles.len(),
            successful = digest.successful(),
            failed = digest.failed(),
            "Completed article processing"
        );
        digest
    }
}

/// Stamp a digest with the date, edition and time of `started`.
///
/// All three come from the same instant, so a batch that runs past midnight
/// still lands in the edition it started in.
fn assemble_digest(
    started: NaiveDateTime,
    preferences: &[String],
    articles: Vec<ArticleDigest>,
) -> Digest {
    Digest {
        local_date: started.date().to_string(),
        time_of_day: edition_for(started.time()).to_string(),
        local_time: started.time().format("%H:%M:%S").to_string(),
        preferences: preferences.to_vec(),
        articles,
    }
}

/// Summarize every entry; see [`Pipeline::run`].
pub async fn build_digest<F, A>(
    preferences: &[String],
    entries: &[CatalogEntry],
    fetcher: &F,
    extractor: &ContentExtractor,
    summarizer: Option<&Summarizer<A>>,
    concurrency: usize,
) -> Digest
where
    F: FetchHtml,
    A: AskAsync<Response = String>,
{
    Pipeline {
        fetcher,
        extractor,
        summarizer,
    }
    .run(preferences, entries, concurrency)
    .await
}
