//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `build`: Normalize the item corpus and write the output artifacts
//! - `search`: Filter and sort previously built rows
//! - `init`: Create a default configuration file

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};

use crate::config::LANGUAGE_ENV;
use crate::core::FlattenStrategy;
use crate::logging::LogFormat;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, global = true)]
    pub log_format: LogFormat,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }
}

#[derive(Debug, Args)]
pub struct BuildCommand {
    /// Target language (overrides config file)
    #[arg(long = "lang", env = LANGUAGE_ENV)]
    pub language: Option<String>,

    /// Output directory (overrides config file)
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Read the corpus from this directory instead of the git repository
    #[arg(long, conflicts_with = "offline")]
    pub corpus_dir: Option<PathBuf>,

    /// Use the existing clone without running git
    #[arg(long)]
    pub offline: bool,

    /// Derive columns from the data instead of the columns file
    #[arg(long)]
    pub discover_columns: bool,

    /// Flattening strategy (overrides config file)
    #[arg(long, value_enum)]
    pub flatten: Option<FlattenStrategy>,
}

#[derive(Debug, Args)]
pub struct SearchCommand {
    /// Keywords; every one must match somewhere in the row
    pub keywords: Vec<String>,

    /// Column to sort by
    #[arg(long)]
    pub sort: Option<String>,

    /// Sort in descending order
    #[arg(long, requires = "sort")]
    pub desc: bool,

    /// Directory holding the built artifacts (overrides config file)
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Show at most this many rows
    #[arg(long)]
    pub limit: Option<usize>,

    /// Put list entries on separate lines
    #[arg(long)]
    pub expanded: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Normalize item documents into rows, columns and name indices
    Build(BuildCommand),
    /// Search and sort built rows
    Search(SearchCommand),
    /// Initialize a new .raidtablerc.json configuration file
    Init,
}
