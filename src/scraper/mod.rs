//! Scraper module - listing walks, detail fetches and orchestration
//!
//! This module contains the fetch pipeline built on top of the transport:
//! - Paginated subreddit listings
//! - Per-post detail fetches and comment tree extraction
//! - Politeness pacing
//! - The coordinator that runs a whole harvest

pub mod comments;
pub mod coordinator;
pub mod detail;
pub mod listing;
pub mod pacing;

pub use comments::{clean_text, extract, flatten_text, top_comment_texts};
pub use coordinator::{harvest, shuffle_posts, Coordinator, Harvest};
pub use detail::{detail_url, parse_details, DetailFetcher, PostDetails};
pub use listing::{listing_url, ListingFetcher, MAX_PAGE_SIZE};
pub use pacing::{DelayRange, Pacer};
