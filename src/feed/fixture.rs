//! Feed client that replays a recorded capture of posts.

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{FeedClient, Post, PostStream};
use crate::crawl::parse_query;
use crate::error::AppError;

/// On-disk layout of a recorded capture.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Capture {
    posts: Vec<Post>,
}

/// A [`FeedClient`] over an in-memory list of posts.
///
/// Searches return every post carrying at least one of the queried hashtags;
/// timelines return every post by the given author. Both keep capture order.
#[derive(Debug, Clone, Default)]
pub struct FixtureFeed {
    posts: Vec<Post>,
}

impl FixtureFeed {
    /// Creates a fixture feed from posts.
    pub fn new(posts: Vec<Post>) -> Self {
        Self { posts }
    }

    /// Loads a capture file of the form `{ "posts": [...] }`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    /// Loads a capture from any reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, AppError> {
        let capture: Capture = serde_json::from_reader(reader)?;
        tracing::debug!(posts = capture.posts.len(), "Loaded feed capture");
        Ok(Self::new(capture.posts))
    }

    /// Number of recorded posts.
    pub fn len(&self) -> usize {
        self.posts.len()
    }

    /// Returns true if the capture holds no posts.
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

impl FeedClient for FixtureFeed {
    fn search(&self, query: &str) -> PostStream<'_> {
        let tags = parse_query(query);
        let matches: Vec<_> = self
            .posts
            .iter()
            .filter(|p| p.has_any_hashtag(&tags))
            .cloned()
            .map(Ok)
            .collect();
        Box::pin(futures::stream::iter(matches))
    }

    fn user_timeline(&self, screen_name: &str) -> PostStream<'_> {
        let matches: Vec<_> = self
            .posts
            .iter()
            .filter(|p| p.author.screen_name == screen_name)
            .cloned()
            .map(Ok)
            .collect();
        Box::pin(futures::stream::iter(matches))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;

    const CAPTURE: &str = r##"{
        "posts": [
            {
                "id": 1,
                "text": "Go! #Trump2016",
                "created_at": "2016-04-16T12:00:00Z",
                "author": { "screen_name": "alice" },
                "hashtags": [{ "text": "Trump2016" }]
            },
            {
                "id": 2,
                "text": "#FeelTheBern #vote",
                "created_at": "2016-04-16T12:05:00Z",
                "author": { "screen_name": "bob" },
                "hashtags": [{ "text": "FeelTheBern" }, { "text": "vote" }],
                "geo": { "latitude": 41.6, "longitude": -93.6 }
            },
            {
                "id": 3,
                "created_at": "2016-04-16T12:10:00Z",
                "author": { "screen_name": "alice" }
            }
        ]
    }"##;

    #[test]
    fn test_from_reader() {
        let feed = FixtureFeed::from_reader(CAPTURE.as_bytes()).unwrap();
        assert_eq!(feed.len(), 3);
        assert!(!feed.is_empty());
    }

    #[tokio::test]
    async fn test_search_matches_any_tag() {
        let feed = FixtureFeed::from_reader(CAPTURE.as_bytes()).unwrap();

        let posts: Vec<Post> = feed
            .search("%23Trump2016%20OR%20%23vote")
            .try_collect()
            .await
            .unwrap();
        let ids: Vec<u64> = posts.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_search_is_case_sensitive() {
        let feed = FixtureFeed::from_reader(CAPTURE.as_bytes()).unwrap();
        let posts: Vec<Post> = feed.search("%23trump2016").try_collect().await.unwrap();
        assert!(posts.is_empty());
    }

    #[tokio::test]
    async fn test_user_timeline() {
        let feed = FixtureFeed::from_reader(CAPTURE.as_bytes()).unwrap();

        let posts: Vec<Post> = feed.user_timeline("alice").try_collect().await.unwrap();
        let ids: Vec<u64> = posts.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }
}
