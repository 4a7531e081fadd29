//! Digest outputs.
//!
//! - [`json`]: writes the digest as JSON for other tools
//! - [`markdown`]: renders the digest for reading, on stdout or to a file
//!
//! ```text
//! json_output_dir/
//! └── 2026-10-18/
//!     └── morning.json
//!
//! markdown_output_dir/
//! └── 2026-10-18_morning.md
//! ```

pub mod json;
pub mod markdown;
