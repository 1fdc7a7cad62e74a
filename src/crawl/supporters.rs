//! Supporter collection from hashtag searches.

use futures::StreamExt;
use indexmap::IndexSet;

use super::build_query;
use crate::error::AppError;
use crate::feed::{FeedClient, Sleeper, ThrottledFeed, TokioSleeper};

/// Collects distinct users who posted any of a candidate's hashtags.
pub struct SupporterCollector<'a, C: ?Sized, S = TokioSleeper> {
    client: &'a C,
    feed: &'a ThrottledFeed<S>,
}

impl<'a, C, S> SupporterCollector<'a, C, S>
where
    C: FeedClient + ?Sized,
    S: Sleeper,
{
    /// Creates a collector searching through `client`.
    pub fn new(client: &'a C, feed: &'a ThrottledFeed<S>) -> Self {
        Self { client, feed }
    }

    /// Returns up to `limit` unique screen-names, in order of first appearance.
    ///
    /// Stops pulling as soon as `limit` names are collected or the search is
    /// exhausted.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::EmptyQuery`] for an empty hashtag list and
    /// [`AppError::Feed`] for unrecoverable feed failures.
    pub async fn collect<T: AsRef<str>>(
        &self,
        hashtags: &[T],
        limit: usize,
    ) -> Result<Vec<String>, AppError> {
        let query = build_query(hashtags)?;
        let mut users: IndexSet<String> = IndexSet::new();

        if limit > 0 {
            tracing::info!(query = %query, limit, "Collecting supporters");

            let mut posts = self.feed.wrap(self.client.search(&query));
            while let Some(post) = posts.next().await {
                let post = post?;
                if users.insert(post.author.screen_name) && users.len() >= limit {
                    break;
                }
            }
        }

        tracing::info!("Number of users collected: {}", users.len());
        Ok(users.into_iter().collect())
    }
}
