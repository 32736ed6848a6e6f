//! Per-post detail fetching
//!
//! Details are decoration: any failure here yields `None` and a log line,
//! never an error.

use crate::model::raw::{dispose, listing_children, RawPost, Thing};
use crate::model::Comment;
use crate::scraper::comments::extract;
use crate::transport::Transport;
use serde_json::Value;

/// A post's own body plus its comment forest
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostDetails {
    pub title: String,
    pub body_text: String,
    pub comments: Vec<Comment>,
}

/// Fetches the comment tree behind a permalink
#[derive(Debug, Clone, Copy)]
pub struct DetailFetcher<'a> {
    transport: &'a Transport,
    base_url: &'a str,
}

impl<'a> DetailFetcher<'a> {
    pub fn new(transport: &'a Transport, base_url: &'a str) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/'),
        }
    }

    /// Fetches and parses `<base><permalink>.json`
    ///
    /// Returns `None` when the request fails or the response does not have
    /// the expected `[post, comments]` shape.
    pub async fn fetch_details(&self, permalink: &str) -> Option<PostDetails> {
        let url = detail_url(self.base_url, permalink);

        match self.transport.request(&url, &[]).await {
            Ok(body) => {
                let details = parse_details(body, permalink)?;
                tracing::info!(
                    "Fetched post details: {} ({} top-level comments)",
                    permalink,
                    details.comments.len()
                );
                Some(details)
            }
            Err(e) => {
                tracing::error!("Failed to fetch post details {}: {}", permalink, e);
                None
            }
        }
    }
}

/// JSON endpoint for a post's permalink
pub fn detail_url(base_url: &str, permalink: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if permalink.starts_with('/') {
        format!("{}{}.json", base, permalink)
    } else {
        format!("{}/{}.json", base, permalink)
    }
}

/// Splits a detail response into the post and its comment forest
///
/// Element 0 is a listing holding the post; element 1 is a listing holding
/// the top-level comments. Anything shorter, or not a sequence, is rejected.
pub fn parse_details(body: Value, permalink: &str) -> Option<PostDetails> {
    let elements = match body {
        Value::Array(elements) if elements.len() >= 2 => elements,
        other => {
            tracing::warn!("Unexpected post data structure for {}", permalink);
            dispose(other);
            return None;
        }
    };

    let mut elements = elements.into_iter();
    let post_listing = elements.next()?;
    let comment_listing = elements.next()?;
    elements.for_each(dispose);

    let mut posts = listing_children(post_listing).into_iter();
    let main = posts
        .next()
        .and_then(|thing| serde_json::from_value::<Thing<RawPost>>(thing).ok())
        .map(|thing| thing.data)
        .unwrap_or_default();
    posts.for_each(dispose);

    Some(PostDetails {
        title: main.title,
        body_text: main.selftext,
        comments: extract(listing_children(comment_listing)),
    })
}
