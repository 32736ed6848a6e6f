//! Subreddit listing walker
//!
//! Walks `/r/<subreddit>/<category>.json` page by page using the opaque
//! `after` cursor, normalizing each entry into a [`Post`].

use crate::config::validate_subreddit_name;
use crate::model::raw::{Listing, RawPost, Thing};
use crate::model::{Category, Post, TimeWindow};
use crate::scraper::pacing::Pacer;
use crate::transport::Transport;
use crate::ConfigError;

/// Largest page the platform will serve
pub const MAX_PAGE_SIZE: usize = 100;

/// Thumbnail values that are placeholders rather than images
const THUMBNAIL_SENTINELS: [&str; 6] = ["self", "default", "nsfw", "spoiler", "image", ""];

/// Fetches post listings for one subreddit at a time
#[derive(Debug, Clone, Copy)]
pub struct ListingFetcher<'a> {
    transport: &'a Transport,
    base_url: &'a str,
    pacer: &'a Pacer,
}

impl<'a> ListingFetcher<'a> {
    pub fn new(transport: &'a Transport, base_url: &'a str, pacer: &'a Pacer) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/'),
            pacer,
        }
    }

    /// Fetches up to `limit` posts from a subreddit listing
    ///
    /// # Pagination
    ///
    /// Pages of `min(100, remaining)` entries are requested until the limit is
    /// reached, a page comes back empty, or no next cursor is returned. A page
    /// that fails (after the transport's retries) ends the walk early and the
    /// posts collected so far are returned.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<Post>)` - At most `limit` posts, possibly fewer or none
    /// * `Err(ConfigError)` - The subreddit name is invalid; nothing was requested
    pub async fn fetch(
        &self,
        subreddit: &str,
        category: Category,
        time_window: TimeWindow,
        limit: usize,
    ) -> Result<Vec<Post>, ConfigError> {
        validate_subreddit_name(subreddit)?;

        tracing::info!(
            "Fetching posts from r/{} (category: {}, limit: {}, time: {})",
            subreddit,
            category,
            limit,
            time_window
        );

        let url = listing_url(self.base_url, subreddit, category);
        let mut posts: Vec<Post> = Vec::with_capacity(limit.min(MAX_PAGE_SIZE));
        let mut after: Option<String> = None;

        while posts.len() < limit {
            let batch_size = (limit - posts.len()).min(MAX_PAGE_SIZE);
            let query = listing_query(batch_size, after.as_deref(), time_window);

            let body = match self.transport.request(&url, &query).await {
                Ok(body) => body,
                Err(e) => {
                    tracing::error!("Failed to fetch posts from r/{}: {}", subreddit, e);
                    break;
                }
            };

            let listing: Listing<Thing<RawPost>> = match serde_json::from_value(body) {
                Ok(listing) => listing,
                Err(e) => {
                    tracing::warn!("Unexpected listing structure for r/{}: {}", subreddit, e);
                    break;
                }
            };

            if listing.data.children.is_empty() {
                tracing::debug!("Empty page for r/{}, listing exhausted", subreddit);
                break;
            }

            let next_cursor = listing.data.next_cursor().map(str::to_string);
            let page_len = listing.data.children.len();

            for child in listing.data.children {
                if posts.len() >= limit {
                    break;
                }
                posts.push(normalize_post(child.data, subreddit));
            }

            tracing::info!(
                "Fetched page of {} entries from r/{} ({}/{} posts)",
                page_len,
                subreddit,
                posts.len(),
                limit
            );

            match next_cursor {
                Some(cursor) if posts.len() < limit => after = Some(cursor),
                _ => break,
            }

            self.pacer.after_page().await;
        }

        tracing::info!("Fetched {} posts from r/{}", posts.len(), subreddit);
        Ok(posts)
    }
}

/// Listing endpoint for a subreddit and category
pub fn listing_url(base_url: &str, subreddit: &str, category: Category) -> String {
    format!(
        "{}/r/{}/{}.json",
        base_url.trim_end_matches('/'),
        subreddit,
        category.as_str()
    )
}

/// Query parameters for one listing page; `after` is omitted on the first page
pub fn listing_query(
    batch_size: usize,
    after: Option<&str>,
    time_window: TimeWindow,
) -> Vec<(&'static str, String)> {
    let mut query = vec![("limit", batch_size.to_string())];
    if let Some(cursor) = after {
        query.push(("after", cursor.to_string()));
    }
    query.push(("raw_json", "1".to_string()));
    query.push(("t", time_window.as_str().to_string()));
    query
}

/// Converts a raw listing entry into a post fetched under `subreddit`
pub fn normalize_post(raw: RawPost, subreddit: &str) -> Post {
    let image_url = image_url(&raw);
    let thumbnail_url = raw.thumbnail.filter(|t| is_real_thumbnail(t));

    Post {
        title: raw.title,
        author: raw.author,
        subreddit: subreddit.to_string(),
        permalink: raw.permalink,
        score: raw.score,
        comment_count: raw.num_comments,
        created_at: raw.created_utc,
        body_text: raw.selftext,
        image_url,
        thumbnail_url,
        top_comments: Vec::new(),
    }
}

/// Direct image link for image posts, else the first preview image
fn image_url(raw: &RawPost) -> Option<String> {
    if raw.post_hint.as_deref() == Some("image") {
        if let Some(url) = raw.url.as_deref().filter(|u| !u.is_empty()) {
            return Some(url.to_string());
        }
    }
    raw.first_preview_url().map(str::to_string)
}

fn is_real_thumbnail(thumbnail: &str) -> bool {
    !THUMBNAIL_SENTINELS.contains(&thumbnail)
        && (thumbnail.starts_with("https://") || thumbnail.starts_with("http://"))
}
