//! Markdown rendering of a digest, for stdout and for the optional file.

use crate::models::Digest;
use crate::utils::{slugify_title, upcase};
use itertools::Itertools;
use std::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

/// Displays a [`Digest`] as a Markdown document.
pub struct MarkdownDigest<'a>(pub &'a Digest);

impl fmt::Display for MarkdownDigest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digest = self.0;
        writeln!(
            f,
            "# {} Digest, {}\n",
            upcase(&digest.time_of_day),
            digest.local_date
        )?;
        if !digest.preferences.is_empty() {
            writeln!(f, "Preferences: {}\n", digest.preferences.iter().join(", "))?;
        }
        if digest.articles.is_empty() {
            return writeln!(f, "_No articles found matching your preferences._");
        }

        writeln!(f, "## Contents\n")?;
        for article in &digest.articles {
            writeln!(f, "- [{}](#{})", article.title, slugify_title(&article.title))?;
        }

        for article in &digest.articles {
            writeln!(f, "\n## {}\n", article.title)?;
            match article.source_tag() {
                Some(source) => writeln!(f, "*{source}* | [Read the article]({})\n", article.url)?,
                None => writeln!(f, "[Read the article]({})\n", article.url)?,
            }
            if article.is_success() {
                writeln!(f, "{}", article.summary)?;
            } else {
                writeln!(f, "_{}_", article.summary)?;
            }
        }
        Ok(())
    }
}

/// Render `digest` as Markdown.
pub fn digest_to_markdown(digest: &Digest) -> String {
    MarkdownDigest(digest).to_string()
}

/// Write the rendered digest to `{markdown_output_dir}/{date}_{time_of_day}.md`.
#[instrument(
    level = "info",
    skip_all,
    fields(markdown_output_dir = %markdown_output_dir.display())
)]
pub async fn write_markdown(
    digest: &Digest,
    markdown_output_dir: &Path,
) -> Result<PathBuf, Box<dyn Error>> {
    fs::create_dir_all(markdown_output_dir).await?;
    let path = markdown_output_dir.join(format!("{}_{}.md", digest.local_date, digest.time_of_day));
    fs::write(&path, digest_to_markdown(digest)).await?;
    info!(path = %path.display(), "Wrote Markdown digest");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ArticleDigest, ArticleStatus, CatalogEntry};
    use pretty_assertions::assert_eq;

    fn entry(title: &str, url: &str) -> CatalogEntry {
        CatalogEntry {
            title: title.to_string(),
            url: url.to_string(),
        }
    }

    fn digest() -> Digest {
        Digest {
            local_date: "2026-10-18".to_string(),
            time_of_day: "evening".to_string(),
            local_time: "18:00:00".to_string(),
            preferences: vec!["AI".to_string(), "Stock Market".to_string()],
            articles: vec![
                ArticleDigest::summarized(
                    &entry("AI chips boom", "https://www.moneycontrol.com/tech/ai.html"),
                    "Chip makers gained.".to_string(),
                ),
                ArticleDigest::failed(
                    &entry("Stock market dips", "http://localhost/dip"),
                    ArticleStatus::ExtractionEmpty,
                ),
            ],
        }
    }

    #[test]
    fn test_digest_to_markdown() {
        let expected = "\
# Evening Digest, 2026-10-18

Preferences: AI, Stock Market

## Contents

- [AI chips boom](#ai-chips-boom)
- [Stock market dips](#stock-market-dips)

## AI chips boom

*moneycontrol* | [Read the article](https://www.moneycontrol.com/tech/ai.html)

Chip makers gained.

## Stock market dips

[Read the article](http://localhost/dip)

_Failed to extract article content._
";
        assert_eq!(digest_to_markdown(&digest()), expected);
    }

    #[test]
    fn test_empty_digest_notice() {
        let mut empty = digest();
        empty.articles.clear();
        let md = digest_to_markdown(&empty);
        assert!(md.ends_with("_No articles found matching your preferences._\n"));
        assert!(!md.contains("## Contents"));
    }

    #[tokio::test]
    async fn test_write_markdown_filename() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_markdown(&digest(), tmp.path()).await.unwrap();
        assert_eq!(path, tmp.path().join("2026-10-18_evening.md"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), digest_to_markdown(&digest()));
    }
}
