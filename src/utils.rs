//! Small helpers for edition naming, log-friendly strings, Markdown anchors
//! and output directories.

use chrono::{NaiveTime, Timelike};
use std::io;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Edition name for a wall-clock time.
///
/// - **morning**: 00:00 - 08:00
/// - **afternoon**: 08:00 - 16:00
/// - **evening**: 16:00 - 24:00
pub fn edition_for(tod: NaiveTime) -> &'static str {
    match tod.hour() {
        0..8 => "morning",
        8..16 => "afternoon",
        _ => "evening",
    }
}

/// Cut `s` to at most `max` bytes for logging, noting how much was dropped.
///
/// The cut never splits a UTF-8 character.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…(+{} bytes)", &s[..end], s.len() - end)
}

/// Turn an article title into a Markdown anchor.
///
/// ```ignore
/// assert_eq!(slugify_title("Hello World"), "hello-world");
/// assert_eq!(slugify_title("Test-Article!"), "test-article");
/// ```
pub fn slugify_title(title: &str) -> String {
    title
        .trim()
        .to_lowercase()
        .replace(|c: char| !c.is_alphanumeric() && c != ' ' && c != '-', "")
        .replace(' ', "-")
}

/// Capitalize the first character, e.g. "morning" -> "Morning".
pub fn upcase(s: &str) -> String {
    let mut c = s.chars();
    match c.next() {
        None => String::new(),
        Some(f) => f.to_uppercase().collect::<String>() + c.as_str(),
    }
}

/// Create `path` if needed and check that files can be written into it.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path).await?;
    let marker = path.join("..__write_check__");
    fs::write(&marker, b"").await?;
    let _ = fs::remove_file(&marker).await;
    info!("Output directory is writable");
    Ok(())
}
