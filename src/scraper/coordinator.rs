//! Harvest coordinator - multi-subreddit orchestration
//!
//! This module runs one harvest end to end:
//! - Walking each configured subreddit's listing in order
//! - Attaching flattened comments to every post with a permalink
//! - Isolating failures so one bad source or post never sinks the run
//! - Shuffling the merged batch

use crate::config::{validate, Config};
use crate::model::Post;
use crate::output::HarvestStats;
use crate::scraper::comments::top_comment_texts;
use crate::scraper::detail::{DetailFetcher, PostDetails};
use crate::scraper::listing::ListingFetcher;
use crate::scraper::pacing::Pacer;
use crate::transport::Transport;
use crate::HarvestError;
use futures::stream::{self, StreamExt};
use rand::seq::SliceRandom;

/// The product of one run
#[derive(Debug, Clone, Default)]
pub struct Harvest {
    /// Normalized posts in random order
    pub posts: Vec<Post>,

    pub stats: HarvestStats,
}

/// Main harvest coordinator structure
#[derive(Debug)]
pub struct Coordinator {
    config: Config,
    transport: Transport,
    pacer: Pacer,
}

impl Coordinator {
    /// Creates a coordinator from a configuration
    ///
    /// The configuration is validated and the transport built here, so every
    /// configuration problem surfaces before the first request.
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(HarvestError)` - The configuration is unusable
    pub fn new(config: Config) -> Result<Self, HarvestError> {
        validate(&config)?;
        let transport = Transport::from_config(&config.transport)?;
        let pacer = Pacer::from_config(&config.pacing);

        Ok(Self {
            config,
            transport,
            pacer,
        })
    }

    /// Runs the harvest across all configured subreddits
    ///
    /// Never fails: a subreddit whose listing cannot be fetched contributes
    /// zero posts, and a post whose details cannot be fetched keeps an empty
    /// comment list. Both are recorded in the returned statistics.
    pub async fn run(&self) -> Harvest {
        let harvest = &self.config.harvest;
        let base_url = self.config.transport.base_url.as_str();
        let listings = ListingFetcher::new(&self.transport, base_url, &self.pacer);

        tracing::info!(
            "Starting harvest of {} subreddits via {} transport",
            harvest.subreddits.len(),
            self.transport.strategy().name()
        );

        let mut posts = Vec::new();
        let mut stats = HarvestStats::default();

        for (index, subreddit) in harvest.subreddits.iter().enumerate() {
            if index > 0 {
                self.pacer.between_subreddits().await;
            }

            let mut batch = match listings
                .fetch(
                    subreddit,
                    harvest.category,
                    harvest.time_window,
                    harvest.posts_per_subreddit,
                )
                .await
            {
                Ok(batch) => batch,
                Err(e) => {
                    tracing::error!("Skipping r/{}: {}", subreddit, e);
                    stats.record_failed_source(subreddit, e.to_string());
                    continue;
                }
            };

            self.attach_comments(&mut batch, &mut stats).await;

            tracing::info!("Collected {} posts from r/{}", batch.len(), subreddit);
            stats.record_source(subreddit, batch.len());
            posts.extend(batch);
        }

        shuffle_posts(&mut posts);

        tracing::info!(
            "Harvest complete: {} posts from {} subreddits ({} failed)",
            posts.len(),
            stats.sources.len(),
            stats.failed_sources().count()
        );

        Harvest { posts, stats }
    }

    /// Fetches details for each post and attaches its capped comment list
    async fn attach_comments(&self, posts: &mut [Post], stats: &mut HarvestStats) {
        let max = self.config.harvest.max_comments_per_post;
        if !self.config.harvest.include_comments || max == 0 {
            return;
        }

        let details = DetailFetcher::new(&self.transport, &self.config.transport.base_url);
        let permalinks: Vec<Option<String>> = posts
            .iter()
            .map(|post| post.has_permalink().then(|| post.permalink.clone()))
            .collect();

        // Outer None: nothing to fetch. Inner None: the fetch failed.
        let results: Vec<Option<Option<PostDetails>>> = stream::iter(permalinks)
            .map(move |permalink| async move {
                match permalink {
                    Some(permalink) => Some(details.fetch_details(&permalink).await),
                    None => None,
                }
            })
            .buffered(self.pacer.detail_concurrency())
            .collect()
            .await;

        for (post, result) in posts.iter_mut().zip(results) {
            match result {
                Some(Some(fetched)) => {
                    post.top_comments = top_comment_texts(&fetched.comments, max);
                    stats.comments_attached += post.top_comments.len();
                }
                Some(None) => stats.detail_failures += 1,
                None => tracing::debug!("Post '{}' has no permalink, skipping details", post.title),
            }
        }
    }
}

/// Puts posts into a uniformly random order
pub fn shuffle_posts(posts: &mut [Post]) {
    posts.shuffle(&mut rand::thread_rng());
}

/// Main entry point for a harvest
///
/// # Arguments
///
/// * `config` - The harvest configuration
///
/// # Returns
///
/// * `Ok(Harvest)` - The shuffled batch and run statistics
/// * `Err(HarvestError)` - The configuration was rejected before any request
pub async fn harvest(config: Config) -> Result<Harvest, HarvestError> {
    let coordinator = Coordinator::new(config)?;
    Ok(coordinator.run().await)
}
