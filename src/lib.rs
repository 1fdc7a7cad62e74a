//! tagaffinity - Hashtag affinity graphs of candidate supporters
//!
//! Finds supporters of competing candidates through the hashtags they post,
//! tallies the other hashtags those supporters use, and assembles a
//! candidate → user → hashtag graph with a deterministic geo layout.

pub mod cli;
pub mod config;
pub mod crawl;
pub mod error;
pub mod feed;
pub mod graph;
pub mod pipeline;
