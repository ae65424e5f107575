//! CLI definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

/// Mirror a local code project into a hierarchical document workspace
#[derive(Parser, Debug)]
#[command(name = "pagesync", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON (for scripting and agent integration)
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Push local source files to the remote workspace
    Push {
        /// Project directory (defaults to current directory)
        path: Option<PathBuf>,

        /// Push every file even if unchanged
        #[arg(long)]
        force: bool,

        /// Only files with these extensions (-e py -e rs or -e py,rs)
        #[arg(short, long = "ext", value_delimiter = ',')]
        ext: Vec<String>,

        /// Only files of this language (e.g. python, rust)
        #[arg(short, long)]
        language: Option<String>,
    },

    /// Pull tracked documents back into local files
    Pull {
        /// Project directory holding the sync cache (defaults to current directory)
        path: Option<PathBuf>,

        /// Directory to write pulled files into
        #[arg(short, long)]
        out: PathBuf,

        /// Overwrite existing local files
        #[arg(long)]
        overwrite: bool,

        /// Only entries of this language
        #[arg(short, long)]
        language: Option<String>,
    },

    /// Show sync statistics for a project
    Stats {
        /// Project directory (defaults to current directory)
        path: Option<PathBuf>,
    },

    /// List orphaned cache entries; remove them with --yes
    Clean {
        /// Project directory (defaults to current directory)
        path: Option<PathBuf>,

        /// Also sweep the remote workspace for duplicate documents of the
        /// same file and archive the strays
        #[arg(long)]
        archive_duplicates: bool,

        /// Actually remove orphaned entries (and archive duplicates)
        #[arg(short, long)]
        yes: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}
