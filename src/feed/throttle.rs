//! Rate-limit handling for paginated feed streams.
//!
//! The provider enforces a global request quota. When it is exhausted the
//! whole crawl pauses for a fixed cool-down and then keeps pulling from the
//! same cursor; the provider guarantees nothing is lost across the pause.

use std::time::Duration;

use async_stream::stream;
use async_trait::async_trait;
use futures::StreamExt;

use super::{FeedError, PostStream};

/// What to do with an error pulled from a feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Sleep for the given duration, then keep pulling.
    Wait(Duration),
    /// Log the error and keep pulling.
    Skip,
    /// Surface the error and end the stream.
    Abort,
}

/// Classifies feed errors into retry decisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    cooldown: Duration,
}

impl RetryPolicy {
    /// Provider quota window.
    pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(15 * 60);

    /// Creates a policy with a custom cool-down interval.
    pub fn new(cooldown: Duration) -> Self {
        Self { cooldown }
    }

    /// Returns the cool-down applied on rate-limit errors.
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Decides how to handle an error. Retries are unbounded.
    pub fn classify(&self, err: &FeedError) -> RetryDecision {
        match err {
            FeedError::RateLimited => RetryDecision::Wait(self.cooldown),
            FeedError::Provider { message } if is_rate_limit_message(message) => {
                RetryDecision::Wait(self.cooldown)
            }
            FeedError::Provider { .. } => RetryDecision::Skip,
            FeedError::Fatal(_) => RetryDecision::Abort,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_COOLDOWN)
    }
}

/// Generic provider errors carry the HTTP status as their last token.
fn is_rate_limit_message(message: &str) -> bool {
    message.split_whitespace().last() == Some("429")
}

/// Suspends the crawl during a cool-down.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Wraps feed streams so that provider errors never escape.
///
/// Rate limits pause and resume, other provider errors are logged and
/// skipped. Only [`FeedError::Fatal`] reaches the caller, as the final item.
pub struct ThrottledFeed<S = TokioSleeper> {
    policy: RetryPolicy,
    sleeper: S,
}

impl ThrottledFeed<TokioSleeper> {
    /// Creates a throttled feed that sleeps on the tokio timer.
    pub fn new(policy: RetryPolicy) -> Self {
        Self::with_sleeper(policy, TokioSleeper)
    }
}

impl<S: Sleeper> ThrottledFeed<S> {
    /// Creates a throttled feed with a custom sleeper.
    pub fn with_sleeper(policy: RetryPolicy, sleeper: S) -> Self {
        Self { policy, sleeper }
    }

    /// Returns the retry policy.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Wraps a raw feed stream.
    ///
    /// The returned stream ends when `inner` is exhausted, when the caller
    /// stops polling, or right after yielding a fatal error.
    pub fn wrap<'a>(&'a self, inner: PostStream<'a>) -> PostStream<'a> {
        let policy = &self.policy;
        let sleeper = &self.sleeper;

        Box::pin(stream! {
            let mut inner = inner;
            while let Some(item) = inner.next().await {
                let err = match item {
                    Ok(post) => {
                        yield Ok(post);
                        continue;
                    }
                    Err(err) => err,
                };

                match policy.classify(&err) {
                    RetryDecision::Wait(duration) => {
                        tracing::warn!(
                            error = %err,
                            wait_secs = duration.as_secs(),
                            "Rate limit reached, sleeping"
                        );
                        sleeper.sleep(duration).await;
                    }
                    RetryDecision::Skip => {
                        tracing::warn!(error = %err, "Feed error, continuing");
                    }
                    RetryDecision::Abort => {
                        tracing::error!(error = %err, "Unrecoverable feed error");
                        yield Err(err);
                        return;
                    }
                }
            }
        })
    }
}
