//! Normalized post records

use serde::{Deserialize, Serialize};

/// One listing entry, normalized
///
/// Created by the listing fetcher; `top_comments` is filled in once by the
/// coordinator and the post is not modified after that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub title: String,

    pub author: String,

    /// The subreddit this post was fetched under (never taken from the payload)
    pub subreddit: String,

    /// Platform-relative path, e.g. `/r/rust/comments/abc123/title/`
    pub permalink: String,

    pub score: i64,

    pub comment_count: i64,

    /// Creation time in epoch seconds (UTC)
    pub created_at: i64,

    /// Self-text body; empty for link posts
    pub body_text: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,

    /// Flattened comment bodies in reading order
    #[serde(default)]
    pub top_comments: Vec<String>,
}

impl Post {
    /// Returns true if this post carries a permalink that can be detail-fetched
    pub fn has_permalink(&self) -> bool {
        !self.permalink.trim().is_empty()
    }

    /// Absolute URL of the post on the given platform host
    pub fn url(&self, base_url: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), self.permalink)
    }

    /// Returns true if this is a link post (no self-text)
    pub fn is_link_post(&self) -> bool {
        self.body_text.trim().is_empty()
    }
}
