//! Run statistics
//!
//! Collected by the coordinator while it works and printed at the end of a
//! run, so partial failures are visible even though they never abort it.

use serde::Serialize;

/// Outcome for one configured subreddit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceStats {
    pub subreddit: String,

    /// Posts contributed to the batch
    pub posts: usize,

    /// Why the source contributed nothing, if it failed outright
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Harvest statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HarvestStats {
    /// One entry per configured subreddit, in processing order
    pub sources: Vec<SourceStats>,

    /// Posts whose detail fetch failed or came back malformed
    pub detail_failures: usize,

    /// Comment strings attached across all posts
    pub comments_attached: usize,
}

impl HarvestStats {
    pub fn record_source(&mut self, subreddit: &str, posts: usize) {
        self.sources.push(SourceStats {
            subreddit: subreddit.to_string(),
            posts,
            error: None,
        });
    }

    pub fn record_failed_source(&mut self, subreddit: &str, error: impl Into<String>) {
        self.sources.push(SourceStats {
            subreddit: subreddit.to_string(),
            posts: 0,
            error: Some(error.into()),
        });
    }

    pub fn total_posts(&self) -> usize {
        self.sources.iter().map(|s| s.posts).sum()
    }

    pub fn failed_sources(&self) -> impl Iterator<Item = &SourceStats> {
        self.sources.iter().filter(|s| s.error.is_some())
    }
}

/// Formats statistics as a short plain-text report
pub fn format_statistics(stats: &HarvestStats) -> String {
    let mut out = String::new();

    out.push_str("=== Harvest Statistics ===\n\n");
    out.push_str(&format!("Total posts: {}\n", stats.total_posts()));
    out.push_str(&format!("Comments attached: {}\n", stats.comments_attached));
    out.push_str(&format!("Detail failures: {}\n", stats.detail_failures));

    out.push_str("\nSubreddits:\n");
    for source in &stats.sources {
        match &source.error {
            None => out.push_str(&format!("  r/{:<24} {:>5} posts\n", source.subreddit, source.posts)),
            Some(error) => out.push_str(&format!("  r/{:<24} FAILED: {}\n", source.subreddit, error)),
        }
    }

    out
}

/// Prints statistics to stderr (stdout is reserved for the digest)
pub fn print_statistics(stats: &HarvestStats) {
    eprint!("{}", format_statistics(stats));
}
