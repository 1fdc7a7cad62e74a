//! Crawl subcommand - build and export the affiliation graph.

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;

use crate::config::Config;
use crate::feed::FixtureFeed;
use crate::graph::export;
use crate::pipeline::CrawlPipeline;

/// Crawl supporters and export the resulting graph.
#[derive(Parser)]
pub struct CrawlCommand {
    /// Recorded feed capture (JSON `{ "posts": [...] }`) to crawl.
    #[arg(short, long)]
    pub fixture: PathBuf,

    /// Where to write the exported graph (`.graphml` for GraphML, JSON otherwise).
    #[arg(short, long, default_value = "affinity_graph.graphml")]
    pub output: PathBuf,

    /// Extra config file, layered above user and project config.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl CrawlCommand {
    /// Run the crawl command.
    pub async fn run(self) -> Result<()> {
        let config = Config::load_with(self.config.as_deref())?;
        config.validate()?;
        tracing::info!(
            candidates = config.candidates.len(),
            unique_users = config.crawl.unique_users,
            hashtags_per_user = config.crawl.hashtags_per_user,
            status_limit = config.crawl.status_limit,
            "Loaded configuration"
        );

        let feed = FixtureFeed::from_path(&self.fixture)
            .wrap_err_with(|| format!("Failed to load feed capture {}", self.fixture.display()))?;
        tracing::info!(posts = feed.len(), "Replaying feed capture");

        let run = CrawlPipeline::from_config(&feed, &config)
            .run(&config.candidates)
            .await?;

        for candidate in &run.summary.candidates {
            tracing::info!(
                candidate = %candidate.name,
                users = candidate.users_collected,
                posts = candidate.posts_examined,
                posts_with_hashtags = candidate.posts_with_hashtags,
                "Candidate summary"
            );
        }

        export(&run.graph, &self.output)
            .wrap_err_with(|| format!("Failed to write {}", self.output.display()))?;
        Ok(())
    }
}
