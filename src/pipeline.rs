//! End-to-end crawl: candidates in, laid-out affiliation graph out.
//!
//! Candidates are processed one at a time. For each one, supporter
//! collection finishes before tallying starts. A rate-limit cool-down pauses
//! the whole run.

use serde::Serialize;

use crate::config::{Candidate, Config, CrawlConfig};
use crate::crawl::{SupporterCollector, TimelineTallier};
use crate::error::AppError;
use crate::feed::{FeedClient, RetryPolicy, Sleeper, ThrottledFeed, TokioSleeper};
use crate::graph::{AffiliationGraph, AffiliationGraphBuilder, GeoLayout, GraphStats};

/// Per-candidate crawl figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateSummary {
    pub name: String,
    pub users_collected: usize,
    pub posts_examined: usize,
    pub posts_with_hashtags: usize,
}

/// Figures for a whole run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub candidates: Vec<CandidateSummary>,
    pub graph: GraphStats,
}

impl RunSummary {
    /// Users collected across all candidates, before cross-candidate dedup.
    pub fn users_collected(&self) -> usize {
        self.candidates.iter().map(|c| c.users_collected).sum()
    }
}

/// The result of a finished run.
#[derive(Debug)]
pub struct CrawlRun {
    pub graph: AffiliationGraph,
    pub summary: RunSummary,
}

/// Drives the crawl for a list of candidates.
pub struct CrawlPipeline<'a, C: ?Sized, S = TokioSleeper> {
    client: &'a C,
    feed: ThrottledFeed<S>,
    crawl: CrawlConfig,
    layout: GeoLayout,
}

impl<'a, C> CrawlPipeline<'a, C, TokioSleeper>
where
    C: FeedClient + ?Sized,
{
    /// Creates a pipeline from configuration.
    pub fn from_config(client: &'a C, config: &Config) -> Self {
        Self::new(
            client,
            ThrottledFeed::new(config.throttle.retry_policy()),
            config.crawl,
            config.layout,
        )
    }

    /// Creates a pipeline with default bounds, cool-down and layout.
    pub fn with_defaults(client: &'a C) -> Self {
        Self::new(
            client,
            ThrottledFeed::new(RetryPolicy::default()),
            CrawlConfig::default(),
            GeoLayout::default(),
        )
    }
}

impl<'a, C, S> CrawlPipeline<'a, C, S>
where
    C: FeedClient + ?Sized,
    S: Sleeper,
{
    pub fn new(
        client: &'a C,
        feed: ThrottledFeed<S>,
        crawl: CrawlConfig,
        layout: GeoLayout,
    ) -> Self {
        Self {
            client,
            feed,
            crawl,
            layout,
        }
    }

    /// Crawls every candidate in order, then lays out the combined graph.
    ///
    /// # Errors
    ///
    /// Fails fast on an empty candidate list, an empty hashtag list, or an
    /// unrecoverable feed error. No partial graph is returned.
    pub async fn run(&self, candidates: &[Candidate]) -> Result<CrawlRun, AppError> {
        if candidates.is_empty() {
            return Err(AppError::NoCandidates);
        }

        let collector = SupporterCollector::new(self.client, &self.feed);
        let tallier = TimelineTallier::new(self.client, &self.feed);
        let mut builder = AffiliationGraphBuilder::new();
        let mut summaries = Vec::with_capacity(candidates.len());

        for candidate in candidates {
            tracing::info!(candidate = %candidate.name, "Collecting data for candidate");

            tracing::info!(candidate = %candidate.name, "Collecting supporters");
            let supporters = collector
                .collect(&candidate.hashtags, self.crawl.unique_users)
                .await
                .map_err(|e| match e {
                    AppError::EmptyQuery => AppError::EmptyHashtags(candidate.name.clone()),
                    other => other,
                })?;

            tracing::info!(candidate = %candidate.name, "Tallying supporter hashtags");
            let (tallies, report) = tallier
                .tally_with_report(
                    &supporters,
                    self.crawl.hashtags_per_user,
                    self.crawl.status_limit,
                )
                .await?;

            builder.append(&candidate.name, &tallies);

            summaries.push(CandidateSummary {
                name: candidate.name.clone(),
                users_collected: supporters.len(),
                posts_examined: report.total_posts(),
                posts_with_hashtags: report.total_posts_with_hashtags(),
            });
            tracing::info!(candidate = %candidate.name, "{} is finished", candidate.name);
        }

        let mut graph = builder.into_graph();
        self.layout.assign(&mut graph);

        let summary = RunSummary {
            candidates: summaries,
            graph: graph.stats(),
        };
        tracing::info!(
            users = summary.users_collected(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "Crawl complete"
        );

        Ok(CrawlRun { graph, summary })
    }
}
