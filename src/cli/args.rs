//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};
use rust_decimal::Decimal;

/// Commission pool distribution across office hierarchies
#[derive(Parser, Debug)]
#[command(name = "profitdist")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Directory with local .profitdist.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Distribute the commission pool of one or more hierarchies
    Distribute {
        /// Hierarchy files (.toml or .json)
        #[arg(required = true, value_hint = ValueHint::FilePath)]
        files: Vec<PathBuf>,
        /// Overall rate applied to the grand total (e.g. 0.025)
        #[arg(short, long)]
        rate: Option<Decimal>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show per-office pool, volume and credit as a tree
    Breakdown {
        /// Hierarchy file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Overall rate applied to the grand total
        #[arg(short, long)]
        rate: Option<Decimal>,
    },

    /// Show transaction volume of an office subtree
    Volume {
        /// Hierarchy file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Office name (default: root)
        #[arg(short, long)]
        office: Option<String>,
    },

    /// Show hierarchy as tree
    Tree {
        /// Hierarchy file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Show config paths
    Path,

    /// Create config template
    Init {
        /// Create global config
        #[arg(short, long)]
        global: bool,
    },
}
