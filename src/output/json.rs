//! JSON export of harvested posts

use crate::model::Post;
use crate::output::{OutputError, OutputResult};
use std::path::Path;

/// Serializes posts as a pretty-printed JSON array
pub fn posts_to_json(posts: &[Post]) -> OutputResult<String> {
    serde_json::to_string_pretty(posts).map_err(|e| OutputError::Format(e.to_string()))
}

/// Writes posts as JSON to a file, or to stdout when `path` is `-`
pub fn write_posts_json(posts: &[Post], path: &Path) -> OutputResult<()> {
    let json = posts_to_json(posts)?;
    super::write_text(path, &json)
}
