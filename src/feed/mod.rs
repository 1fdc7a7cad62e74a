//! Feed abstraction over the social platform.
//!
//! The live platform client is an external collaborator. This module defines
//! the seam it must implement and the wrappers the crawl builds on top:
//!
//! - [`FeedClient`] - Paginated search and per-user timeline streams
//! - [`ThrottledFeed`] - Rate-limit aware wrapper with pluggable sleeping
//! - [`FixtureFeed`] - Replays a recorded capture of posts
//!
//! # Usage
//!
//! ```ignore
//! use tagaffinity::feed::{FeedClient, ThrottledFeed};
//!
//! let throttled = ThrottledFeed::new(RetryPolicy::default());
//! let posts = throttled.wrap(client.search("%23Trump2016"));
//! ```

mod fixture;
mod models;
mod throttle;

pub use fixture::FixtureFeed;
pub use models::{Author, Coordinates, Hashtag, Post};
pub use throttle::{RetryDecision, RetryPolicy, Sleeper, ThrottledFeed, TokioSleeper};

use std::pin::Pin;

use futures::Stream;
use thiserror::Error;

/// Errors reported by a feed while paging through results.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeedError {
    /// The provider quota is exhausted for the current window.
    #[error("rate limit exceeded")]
    RateLimited,

    /// Any other provider-reported failure. The message may embed an HTTP
    /// status code as its last token (e.g. `"Too Many Requests 429"`).
    #[error("{message}")]
    Provider { message: String },

    /// Unrecoverable failure (bad credentials, broken client).
    #[error("fatal feed error: {0}")]
    Fatal(String),
}

impl FeedError {
    /// Creates a provider error from any message.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
        }
    }
}

/// A stream of posts from a paginated feed query.
///
/// Items are fetched lazily. An `Err` item reports a failed page fetch; the
/// stream may still yield further items after it.
pub type PostStream<'a> = Pin<Box<dyn Stream<Item = Result<Post, FeedError>> + Send + 'a>>;

/// Paginated access to the social platform.
///
/// Implementations wrap an authenticated client. Both operations return
/// lazy streams; nothing is fetched until the stream is polled.
pub trait FeedClient: Send + Sync {
    /// Searches recent posts matching an encoded query (see
    /// [`build_query`](crate::crawl::build_query)).
    fn search(&self, query: &str) -> PostStream<'_>;

    /// Pages through the recent posts of one user, newest first.
    fn user_timeline(&self, screen_name: &str) -> PostStream<'_>;
}
