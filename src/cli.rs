//! Command-line interface definitions for News Digest.
//!
//! Every option can also come from the YAML config; values given here win.

use clap::Parser;
use std::path::PathBuf;

/// Summarize news articles that match your keyword preferences.
///
/// # Examples
///
/// ```sh
/// # Digest for the configured preferences, printed as Markdown
/// news_digest -c config.yaml
///
/// # Override preferences and also write JSON and Markdown files
/// news_digest -k "AI" -k "Stock Market" -j ./json -m ./markdown
///
/// # Only show the extracted article text of one page
/// news_digest --extract-only -u https://www.example.com/article.html
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to config.yaml file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Keyword preference; repeat for several. Replaces the configured list
    #[arg(short, long = "keyword", value_name = "KEYWORD")]
    pub keywords: Vec<String>,

    /// Article URL to process directly instead of searching the catalog
    #[arg(short = 'u', long = "url", value_name = "URL")]
    pub urls: Vec<String>,

    /// Print the extracted article text instead of summarizing it
    #[arg(long)]
    pub extract_only: bool,

    /// Output directory for the JSON digest
    #[arg(short, long)]
    pub json_output_dir: Option<PathBuf>,

    /// Output directory for the Markdown digest
    #[arg(short, long)]
    pub markdown_output_dir: Option<PathBuf>,

    /// API key for the chat completions endpoint
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Maximum number of articles processed at once
    #[arg(long)]
    pub concurrency: Option<usize>,
}
