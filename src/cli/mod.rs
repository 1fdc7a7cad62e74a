//! CLI module for tagaffinity.
//!
//! Subcommands:
//! - `crawl`: Run the supporter crawl and export the affiliation graph
//! - `inspect`: Summarize a previously exported graph

mod crawl;
mod inspect;

use clap::{Parser, Subcommand};

pub use crawl::CrawlCommand;
pub use inspect::InspectCommand;

/// tagaffinity - Hashtag affinity graphs of candidate supporters
#[derive(Parser)]
#[command(name = "tagaffinity")]
#[command(about = "Crawl candidate supporters and map the hashtags they use")]
#[command(version)]
pub struct App {
    /// Run in verbose mode
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Crawl supporters of the configured candidates and export the graph
    Crawl(CrawlCommand),

    /// Print statistics and hashtag usage of an exported graph
    Inspect(InspectCommand),
}

impl App {
    /// Run the CLI application.
    pub async fn run(self) -> color_eyre::Result<()> {
        match self.command {
            Command::Crawl(cmd) => cmd.run().await,
            Command::Inspect(cmd) => cmd.run(),
        }
    }
}
