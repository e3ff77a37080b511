use clap::Parser;
use sift_search::{Location, Query};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "sift",
    version,
    about = "Terminal search results view with offline fallback results"
)]
pub struct Cli {
    /// Query to open with; multiple words are joined with spaces.
    pub query: Vec<String>,

    /// Start from a navigation location instead, e.g. "/search?q=rust".
    #[arg(long, value_name = "LOCATION", conflicts_with = "query")]
    pub location: Option<String>,

    /// Mark the initial search as "I'm feeling lucky".
    #[arg(long)]
    pub lucky: bool,

    /// YAML config file (defaults to ./sift.yaml when present).
    #[arg(long, short, env = "SIFT_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Run one search without the UI and print the settled state as JSON.
    #[arg(long)]
    pub json: bool,

    /// Debug-level logging (and stderr logging with --json).
    #[arg(long, short)]
    pub verbose: bool,
}

impl Cli {
    /// Initial navigation, if the command line names one.
    pub fn entry(&self) -> Option<Location> {
        if let Some(raw) = &self.location {
            let mut location = Location::parse(raw);
            location.lucky |= self.lucky;
            return Some(location);
        }
        let query: Query = self.query.join(" ").parse().ok()?;
        Some(if self.lucky {
            Location::lucky(&query)
        } else {
            Location::search(&query)
        })
    }
}
