//! Output module for harvested batches
//!
//! This module handles:
//! - Rendering the summarizer digest
//! - Exporting posts as JSON
//! - Recording and printing run statistics

mod digest;
mod json;
pub mod stats;

pub use digest::{format_digest, truncate_chars, write_digest, BODY_LIMIT, COMMENT_LIMIT};
pub use json::{posts_to_json, write_posts_json};
pub use stats::{format_statistics, print_statistics, HarvestStats, SourceStats};

use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to format output: {0}")]
    Format(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Writes `content` to `path`, or to stdout when `path` is `-`
fn write_text(path: &Path, content: &str) -> OutputResult<()> {
    if path.as_os_str() == "-" {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        handle.write_all(content.as_bytes())?;
        handle.write_all(b"\n")?;
        handle.flush()?;
        return Ok(());
    }

    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    file.write_all(b"\n")?;
    Ok(())
}
