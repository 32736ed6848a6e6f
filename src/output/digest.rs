//! Summarizer digest generation
//!
//! Renders the front of the shuffled batch as the plain-text block a
//! summarizer prompt embeds. Long fields are truncated to keep the prompt
//! small.

use crate::model::Post;
use crate::output::OutputResult;
use chrono::DateTime;
use std::path::Path;

/// Maximum characters of self-text per post
pub const BODY_LIMIT: usize = 500;

/// Maximum characters per comment
pub const COMMENT_LIMIT: usize = 200;

/// Formats up to `max_posts` posts for the summarizer
///
/// # Arguments
///
/// * `posts` - The harvested batch, in output order
/// * `max_posts` - How many posts from the front of the batch to include
/// * `max_comments` - How many comments to show per post
///
/// # Returns
///
/// A formatted string, posts separated by blank lines
pub fn format_digest(posts: &[Post], max_posts: usize, max_comments: usize) -> String {
    posts
        .iter()
        .take(max_posts)
        .enumerate()
        .map(|(i, post)| format_post(i + 1, post, max_comments))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn format_post(number: usize, post: &Post, max_comments: usize) -> String {
    let mut block = String::new();

    block.push_str(&format!("Post #{}:\n", number));
    block.push_str(&format!("Title: {}\n", post.title));
    block.push_str(&format!("Subreddit: r/{}\n", post.subreddit));
    block.push_str(&format!(
        "Score: {} | Comments: {}\n",
        post.score, post.comment_count
    ));
    if let Some(posted) = DateTime::from_timestamp(post.created_at, 0) {
        block.push_str(&format!("Posted: {}\n", posted.format("%Y-%m-%d %H:%M UTC")));
    }

    if post.is_link_post() {
        block.push_str("Content: (Link post)\n");
    } else {
        let body = truncate_chars(post.body_text.trim(), BODY_LIMIT);
        block.push_str(&format!("Content: {}\n", body));
    }

    if !post.top_comments.is_empty() && max_comments > 0 {
        block.push_str("Top Comments:\n");
        for comment in post.top_comments.iter().take(max_comments) {
            block.push_str(&format!("  - {}\n", truncate_chars(comment, COMMENT_LIMIT)));
        }
    }

    block.push_str(&format!("URL: {}", post.permalink));
    block
}

/// Returns at most `limit` characters of `text`, never splitting a character
pub fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

/// Writes the digest to a file, or to stdout when `path` is `-`
pub fn write_digest(
    posts: &[Post],
    max_posts: usize,
    max_comments: usize,
    path: &Path,
) -> OutputResult<()> {
    let digest = format_digest(posts, max_posts, max_comments);
    super::write_text(path, &digest)
}
