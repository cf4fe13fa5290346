//! Command line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use rsvpboard_core::config::SOURCE_ENV_VAR;
use rsvpboard_core::{Config, FilterCriteria, Group, QueryScope, RsvpStatus};

#[derive(Parser, Debug)]
#[command(name = "rsvpboard", version, about = "Wedding RSVP guest list dashboard")]
pub struct Cli {
    /// Guest CSV file, scraper snapshot directory, or http(s) URL
    #[arg(long, global = true, env = SOURCE_ENV_VAR)]
    pub source: Option<String>,

    /// Also write logs to a daily rolling file in this directory
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Headline counts, response rate and per-event / per-side breakdowns
    Summary {
        #[command(flatten)]
        filters: FilterArgs,

        /// Print the statistics as JSON
        #[arg(long)]
        json: bool,
    },

    /// List guests matching the filters
    List {
        #[command(flatten)]
        filters: FilterArgs,

        /// Show email, phone and address
        #[arg(long)]
        contacts: bool,
    },

    /// Write guests matching the filters to a CSV file
    Export {
        #[command(flatten)]
        filters: FilterArgs,

        #[arg(long, short)]
        out: PathBuf,

        /// Include Email, Phone and Address columns
        #[arg(long)]
        contacts: bool,
    },

    /// Show the newest scraper failure log
    Failures {
        /// Directory holding failed_guests_*.json (defaults to the source directory)
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Show the configuration, or write the default one
    Config {
        /// Write a default config file if none exists
        #[arg(long)]
        init: bool,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Bride, Groom or Unknown
    #[arg(long)]
    pub group: Option<Group>,

    /// Primary event status: attending, declined, no-response, not-invited
    #[arg(long)]
    pub status: Option<RsvpStatus>,

    /// Exact relationship label, e.g. "Saumya's Family"
    #[arg(long)]
    pub side: Option<String>,

    /// Case-insensitive name search
    #[arg(long)]
    pub search: Option<String>,

    /// Let --search also match the relationship label
    #[arg(long)]
    pub search_side: bool,
}

impl FilterArgs {
    pub fn criteria(&self, config: &Config) -> FilterCriteria {
        let scope = if self.search_side || config.search_includes_side {
            QueryScope::NamesAndSide
        } else {
            QueryScope::Names
        };

        FilterCriteria {
            group: self.group.into(),
            status: self.status.into(),
            side: self.side.clone().into(),
            query: self.search.clone().unwrap_or_default(),
            scope,
        }
    }
}
