//! Supporter crawl: from candidate hashtags to per-user hashtag tallies.
//!
//! - [`build_query`] - Encode a candidate's hashtags as one search query
//! - [`SupporterCollector`] - Collect unique users posting those hashtags
//! - [`TimelineTallier`] - Count the hashtags each user posts

mod query;
mod supporters;
mod timeline;

pub use query::{build_query, parse_query};
pub use supporters::SupporterCollector;
pub use timeline::{HashtagTally, TallyReport, TimelineTallier, UserStats, UserTally};

#[cfg(test)]
pub(crate) mod mock {
    //! Scripted feed client for crawl tests.

    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use futures::StreamExt;

    use crate::feed::{FeedClient, FeedError, Post, PostStream};

    type Script = Vec<Result<Post, FeedError>>;

    /// Replays scripted pages and counts how many items were pulled.
    #[derive(Default)]
    pub struct ScriptedFeed {
        pub search: Script,
        pub timelines: HashMap<String, Script>,
        pub queries: Mutex<Vec<String>>,
        pub pulled: Arc<AtomicUsize>,
    }

    impl ScriptedFeed {
        pub fn with_search(search: Script) -> Self {
            Self {
                search,
                ..Default::default()
            }
        }

        pub fn timeline(mut self, user: &str, items: Script) -> Self {
            self.timelines.insert(user.to_string(), items);
            self
        }

        pub fn pulled(&self) -> usize {
            self.pulled.load(Ordering::SeqCst)
        }

        fn replay(&self, items: Script) -> PostStream<'_> {
            let pulled = Arc::clone(&self.pulled);
            Box::pin(futures::stream::iter(items).inspect(move |_| {
                pulled.fetch_add(1, Ordering::SeqCst);
            }))
        }
    }

    impl FeedClient for ScriptedFeed {
        fn search(&self, query: &str) -> PostStream<'_> {
            self.queries.lock().unwrap().push(query.to_string());
            self.replay(self.search.clone())
        }

        fn user_timeline(&self, screen_name: &str) -> PostStream<'_> {
            let items = self.timelines.get(screen_name).cloned().unwrap_or_default();
            self.replay(items)
        }
    }
}
