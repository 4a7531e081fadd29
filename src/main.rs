//! # News Digest
//!
//! Picks news articles whose titles match your keyword preferences, pulls the
//! article prose out of each page and summarizes it through an
//! OpenAI-compatible chat completions API.
//!
//! ## Usage
//!
//! ```sh
//! news_digest -c config.yaml -k "AI" -j ./json -m ./markdown
//! ```
//!
//! ## Architecture
//!
//! 1. **Catalog**: static entries from the config plus RSS/Atom feed items
//! 2. **Selection**: keep entries whose title contains a preference keyword
//! 3. **Extraction**: fetch each page and locate its main text with an ordered
//!    list of CSS selectors, falling back to every `<p>` on the page
//! 4. **Summarization**: chunk the text and ask the LLM for a short summary
//! 5. **Output**: Markdown on stdout, optional JSON and Markdown files
//!
//! A failure for one article leaves a placeholder in its slot; the rest of
//! the batch carries on.

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod catalog;
mod cli;
mod config;
mod digest;
mod error;
mod extract;
mod fetch;
mod models;
mod outputs;
mod summarize;
#[cfg(test)]
mod testing;
mod utils;

use api::{ChatClient, RetryAsk};
use catalog::{assemble_catalog, filter_by_keywords};
use cli::Cli;
use config::DigestConfig;
use digest::{Pipeline, build_digest};
use extract::ContentExtractor;
use fetch::{ArticleFetcher, FetchHtml};
use models::CatalogEntry;
use outputs::{json, markdown};
use summarize::Summarizer;
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("news_digest starting up");

    let args = Cli::parse();
    debug!(
        ?args.config,
        ?args.keywords,
        ?args.urls,
        extract_only = args.extract_only,
        "Parsed CLI arguments"
    );

    let mut config = DigestConfig::load_or_default(args.config.as_deref())?;
    apply_overrides(&mut config, &args);
    config.validate()?;

    // Fail early on unwritable output directories.
    for dir in [&args.json_output_dir, &args.markdown_output_dir].into_iter().flatten() {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(
                path = %dir.display(),
                error = %e,
                "Output directory is not writable (fix perms or choose a different path)"
            );
            return Err(e.into());
        }
    }

    let extractor = ContentExtractor::from_config(&config.extraction)?;
    let fetcher = ArticleFetcher::new(&config.fetch)?;

    let entries = select_entries(&config, &args.urls, &fetcher).await;
    if entries.is_empty() {
        info!(preferences = ?config.preferences, "No articles found matching preferences");
        println!("No articles found matching your preferences.");
        return Ok(());
    }
    info!(count = entries.len(), "Articles selected");

    if args.extract_only {
        print_extracted(&entries, &fetcher, &extractor).await;
    } else {
        let summarizer = match Summarizer::from_config(&config.llm, &config.summary) {
            Ok(summarizer) => Some(summarizer),
            Err(e) => {
                warn!(error = %e, "Summarizer unavailable; articles will carry a placeholder");
                None
            }
        };

        let digest = build_digest(
            &config.preferences,
            &entries,
            &fetcher,
            &extractor,
            summarizer.as_ref(),
            config.concurrency,
        )
        .await;

        print!("{}", markdown::MarkdownDigest(&digest));

        if let Some(dir) = &args.json_output_dir {
            json::write_digest(&digest, dir).await?;
        }
        if let Some(dir) = &args.markdown_output_dir {
            markdown::write_markdown(&digest, dir).await?;
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}

/// Command-line values replace their configured counterparts.
fn apply_overrides(config: &mut DigestConfig, args: &Cli) {
    if !args.keywords.is_empty() {
        config.preferences = args.keywords.clone();
    }
    if let Some(key) = args.api_key.as_deref().filter(|key| !key.trim().is_empty()) {
        config.llm.api_key = Some(key.to_string());
    }
    if let Some(concurrency) = args.concurrency {
        config.concurrency = concurrency;
    }
}

/// Explicit URLs bypass the catalog; otherwise select catalog entries by
/// keyword.
async fn select_entries<F: FetchHtml>(
    config: &DigestConfig,
    urls: &[String],
    fetcher: &F,
) -> Vec<CatalogEntry> {
    if !urls.is_empty() {
        return urls
            .iter()
            .map(|url| CatalogEntry {
                title: url.clone(),
                url: url.clone(),
            })
            .collect();
    }
    let catalog = assemble_catalog(fetcher, &config.catalog, &config.feeds).await;
    filter_by_keywords(&config.preferences, &catalog)
}

async fn print_extracted<F: FetchHtml>(
    entries: &[CatalogEntry],
    fetcher: &F,
    extractor: &ContentExtractor,
) {
    let pipeline: Pipeline<'_, F, RetryAsk<ChatClient>> = Pipeline {
        fetcher,
        extractor,
        summarizer: None,
    };
    for entry in entries {
        println!("# {}\n{}\n", entry.title.trim(), entry.url);
        match pipeline.extract_article(&entry.url).await {
            Ok(text) if text.is_empty() => println!("_{}_\n", models::EXTRACTION_EMPTY_MESSAGE),
            Ok(text) => println!("{text}\n"),
            Err(e) => println!("_{}_ ({e})\n", models::FETCH_FAILED_MESSAGE),
        }
    }
}
