//! Inspect subcommand - summarize an exported graph.

use std::path::PathBuf;

use clap::Parser;
use color_eyre::Result;

use crate::graph::import;

/// Print statistics of an exported graph.
#[derive(Parser)]
pub struct InspectCommand {
    /// Exported graph file (`.graphml` or JSON).
    pub input: PathBuf,

    /// Also list each user's hashtag usage.
    #[arg(short, long)]
    pub usage: bool,
}

impl InspectCommand {
    /// Run the inspect command.
    pub fn run(self) -> Result<()> {
        let graph = import(&self.input)?;
        let stats = graph.stats();

        println!("Graph: {}", self.input.display());
        println!("  candidates: {}", stats.candidates);
        println!("  users:      {}", stats.users);
        println!("  hashtags:   {}", stats.hashtags);
        println!("  edges:      {}", stats.edges);

        if self.usage {
            for tally in graph.user_tallies() {
                println!("User: {}", tally.screen_name);
                println!("Hashtags Used:");
                for (hashtag, count) in &tally.hashtags {
                    println!("  #{} :: {}", hashtag, count);
                }
            }
        }

        Ok(())
    }
}
