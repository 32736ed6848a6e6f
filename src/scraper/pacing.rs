//! Politeness pacing
//!
//! The platform rate-limits aggressively, so the scraper pauses for a random
//! duration between listing pages and between subreddits, and caps how many
//! detail fetches are in flight at once.

use crate::config::PacingConfig;
use rand::Rng;
use std::time::Duration;
use tokio::time::sleep;

/// An inclusive range of pause durations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    min: Duration,
    max: Duration,
}

impl DelayRange {
    pub fn from_millis(min_ms: u64, max_ms: u64) -> Self {
        Self {
            min: Duration::from_millis(min_ms.min(max_ms)),
            max: Duration::from_millis(min_ms.max(max_ms)),
        }
    }

    /// A range that never pauses
    pub fn none() -> Self {
        Self::from_millis(0, 0)
    }

    /// Draws a pause uniformly from the range
    pub fn sample(&self) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        let min_ms = self.min.as_millis() as u64;
        let max_ms = self.max.as_millis() as u64;
        Duration::from_millis(rand::thread_rng().gen_range(min_ms..=max_ms))
    }
}

/// Pacing policy for one run
#[derive(Debug, Clone, Copy)]
pub struct Pacer {
    page: DelayRange,
    subreddit: DelayRange,
    detail_concurrency: usize,
}

impl Pacer {
    pub fn new(page: DelayRange, subreddit: DelayRange, detail_concurrency: usize) -> Self {
        Self {
            page,
            subreddit,
            detail_concurrency: detail_concurrency.max(1),
        }
    }

    pub fn from_config(config: &PacingConfig) -> Self {
        Self::new(
            DelayRange::from_millis(config.page_delay_min_ms, config.page_delay_max_ms),
            DelayRange::from_millis(config.subreddit_delay_min_ms, config.subreddit_delay_max_ms),
            config.max_concurrent_details,
        )
    }

    /// No pauses, sequential detail fetches
    pub fn none() -> Self {
        Self::new(DelayRange::none(), DelayRange::none(), 1)
    }

    /// Pause taken after a listing page when another page follows
    pub async fn after_page(&self) {
        pause(self.page, "next page").await;
    }

    /// Pause taken before moving on to the next subreddit
    pub async fn between_subreddits(&self) {
        pause(self.subreddit, "next subreddit").await;
    }

    /// Maximum number of detail fetches in flight
    pub fn detail_concurrency(&self) -> usize {
        self.detail_concurrency
    }
}

async fn pause(range: DelayRange, label: &str) {
    let delay = range.sample();
    if delay.is_zero() {
        return;
    }
    tracing::debug!("Pausing {:?} before {}", delay, label);
    sleep(delay).await;
}
