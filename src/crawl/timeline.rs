//! Per-user hashtag tallies from recent timelines.

use futures::StreamExt;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::feed::{FeedClient, Post, Sleeper, ThrottledFeed, TokioSleeper};

/// Hashtag text (case-sensitive, no `#`) to occurrence count, in first-seen order.
pub type HashtagTally = IndexMap<String, u32>;

/// The hashtags one user posted within the sampled part of their timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserTally {
    /// Screen-name of the user.
    pub screen_name: String,
    /// Hashtag usage counts.
    pub hashtags: HashtagTally,
}

impl UserTally {
    /// Creates an empty tally for a user.
    pub fn new(screen_name: impl Into<String>) -> Self {
        Self {
            screen_name: screen_name.into(),
            hashtags: HashtagTally::new(),
        }
    }

    /// Creates a tally from `(hashtag, count)` pairs.
    pub fn from_counts<'h>(
        screen_name: impl Into<String>,
        counts: impl IntoIterator<Item = (&'h str, u32)>,
    ) -> Self {
        Self {
            screen_name: screen_name.into(),
            hashtags: counts
                .into_iter()
                .map(|(tag, count)| (tag.to_string(), count))
                .collect(),
        }
    }

    /// Number of distinct hashtags.
    pub fn distinct(&self) -> usize {
        self.hashtags.len()
    }

    /// Total hashtag uses across all distinct hashtags.
    pub fn total_uses(&self) -> u32 {
        self.hashtags.values().sum()
    }
}

/// Sampling statistics for one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserStats {
    pub screen_name: String,
    /// Posts pulled from the timeline.
    pub posts_examined: usize,
    /// Examined posts carrying at least one hashtag.
    pub posts_with_hashtags: usize,
}

/// Sampling statistics for a whole tally run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TallyReport {
    pub users: Vec<UserStats>,
}

impl TallyReport {
    /// Posts examined across all users.
    pub fn total_posts(&self) -> usize {
        self.users.iter().map(|u| u.posts_examined).sum()
    }

    /// Posts with hashtags across all users.
    pub fn total_posts_with_hashtags(&self) -> usize {
        self.users.iter().map(|u| u.posts_with_hashtags).sum()
    }
}

/// Walks user timelines and counts the hashtags they post.
pub struct TimelineTallier<'a, C: ?Sized, S = TokioSleeper> {
    client: &'a C,
    feed: &'a ThrottledFeed<S>,
}

impl<'a, C, S> TimelineTallier<'a, C, S>
where
    C: FeedClient + ?Sized,
    S: Sleeper,
{
    /// Creates a tallier reading timelines through `client`.
    pub fn new(client: &'a C, feed: &'a ThrottledFeed<S>) -> Self {
        Self { client, feed }
    }

    /// Tallies hashtags for each user, preserving input order.
    ///
    /// See [`tally_with_report`](Self::tally_with_report).
    pub async fn tally(
        &self,
        users: &[String],
        max_distinct_hashtags: usize,
        max_posts_per_user: usize,
    ) -> Result<Vec<UserTally>, AppError> {
        let (tallies, _) = self
            .tally_with_report(users, max_distinct_hashtags, max_posts_per_user)
            .await?;
        Ok(tallies)
    }

    /// Tallies hashtags for each user and reports sampling statistics.
    ///
    /// A user's timeline is read until the tally holds
    /// `max_distinct_hashtags` keys or `max_posts_per_user` posts have been
    /// examined. Users without any hashtags still get an (empty) tally.
    pub async fn tally_with_report(
        &self,
        users: &[String],
        max_distinct_hashtags: usize,
        max_posts_per_user: usize,
    ) -> Result<(Vec<UserTally>, TallyReport), AppError> {
        tracing::info!(
            users = users.len(),
            max_distinct_hashtags,
            max_posts_per_user,
            "Tallying hashtags"
        );

        let mut tallies = Vec::with_capacity(users.len());
        let mut report = TallyReport::default();

        for user in users {
            let (tally, stats) = self
                .tally_user(user, max_distinct_hashtags, max_posts_per_user)
                .await?;
            tracing::debug!(
                user = %user,
                distinct = tally.distinct(),
                posts = stats.posts_examined,
                "Tallied user"
            );
            tallies.push(tally);
            report.users.push(stats);
        }

        tracing::info!(
            posts = report.total_posts(),
            posts_with_hashtags = report.total_posts_with_hashtags(),
            "Finished tallying hashtags"
        );
        Ok((tallies, report))
    }

    async fn tally_user(
        &self,
        screen_name: &str,
        max_distinct: usize,
        max_posts: usize,
    ) -> Result<(UserTally, UserStats), AppError> {
        let mut tally = UserTally::new(screen_name);
        let mut stats = UserStats {
            screen_name: screen_name.to_string(),
            ..Default::default()
        };

        if max_distinct == 0 || max_posts == 0 {
            return Ok((tally, stats));
        }

        let mut posts = self.feed.wrap(self.client.user_timeline(screen_name));
        while let Some(post) = posts.next().await {
            let post = post?;
            stats.posts_examined += 1;
            if !post.hashtags.is_empty() {
                stats.posts_with_hashtags += 1;
            }
            count_hashtags(&mut tally.hashtags, &post, max_distinct);
            tracing::trace!(
                user = %screen_name,
                post_id = post.id,
                created_at = %post.created_at,
                geo = ?post.geo,
                hashtags = post.hashtags.len(),
                "Examined post"
            );

            if tally.distinct() >= max_distinct || stats.posts_examined >= max_posts {
                break;
            }
        }

        Ok((tally, stats))
    }
}

/// Adds a post's hashtags to a tally. Known hashtags are always counted; new
/// ones are only admitted while the tally is below `max_distinct` keys.
fn count_hashtags(tally: &mut HashtagTally, post: &Post, max_distinct: usize) {
    for hashtag in &post.hashtags {
        if let Some(count) = tally.get_mut(&hashtag.text) {
            *count += 1;
        } else if tally.len() < max_distinct {
            tally.insert(hashtag.text.clone(), 1);
        }
    }
}
