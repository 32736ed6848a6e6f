//! Data model for harvested content
//!
//! # Components
//!
//! - `Post`: a normalized listing entry, later decorated with its top comments
//! - `Comment`: a node in a post's reply tree
//! - `Category` / `TimeWindow`: listing parameters
//! - `raw`: the lenient schema responses are decoded into

mod comment;
mod params;
mod post;
pub mod raw;

// Re-export main types
pub use comment::Comment;
pub use params::{Category, TimeWindow};
pub use post::Post;
