//! CLI definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

/// psync - keep block patterns in sync with a directory of JSON files
#[derive(Parser, Debug)]
#[command(name = "psync", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Database path (default: $PSYNC_DB, then ~/.psync/data/patterns.db)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Actor name for audit trail (default: $PSYNC_ACTOR, then git user.name)
    #[arg(long, global = true)]
    pub actor: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors and warnings)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the pattern database
    Init {
        /// Recreate the database if it already exists
        #[arg(long)]
        force: bool,
    },

    /// Export published patterns to JSON files
    Export(ExportArgs),

    /// Import JSON files into the store and delete patterns with no file
    Import(ImportArgs),

    /// Manage stored patterns
    Pattern {
        #[command(subcommand)]
        command: PatternCommands,
    },

    /// Show recent store changes from the audit log
    History {
        /// Maximum events to show
        #[arg(short, long, default_value = "20")]
        limit: u32,
    },

    /// Print version information
    Version,

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

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Destination directory (default: $PSYNC_PATTERNS_DIR, then <project>/patterns/blocks-sync)
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Pretty-print JSON (default)
    #[arg(long, overrides_with = "no_pretty")]
    pub pretty: bool,

    /// Write compact single-line JSON
    #[arg(long, overrides_with = "pretty")]
    pub no_pretty: bool,

    /// Slug namespace, written as <prefix>/<slug> (default: $PSYNC_PREFIX, then
    /// the project directory name). Import drops the '/', so a prefixed export
    /// re-imports under new slugs; pass --prefix "" for a lossless round trip.
    #[arg(long)]
    pub prefix: Option<String>,
}

impl ExportArgs {
    /// Effective pretty flag; the last of `--pretty`/`--no-pretty` wins.
    #[must_use]
    pub fn pretty(&self) -> bool {
        !self.no_pretty
    }
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Source directory (default: $PSYNC_PATTERNS_DIR, then <project>/patterns/blocks-sync)
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Report what would change without writing
    #[arg(long)]
    pub dry_run: bool,

    /// Only print changes, warnings and the summary
    #[arg(long)]
    pub no_verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum PatternCommands {
    /// Create a pattern
    Add {
        /// Pattern title
        title: String,

        /// Block markup
        #[arg(long)]
        content: String,

        /// Slug (default: derived from the title)
        #[arg(long)]
        slug: Option<String>,

        /// Category name (repeatable)
        #[arg(short, long = "category")]
        categories: Vec<String>,

        /// Mark the pattern as unsynced
        #[arg(long)]
        unsynced: bool,

        /// Create as draft (drafts are not exported)
        #[arg(long)]
        draft: bool,
    },

    /// List patterns
    List {
        /// Include drafts
        #[arg(long)]
        all: bool,
    },

    /// Show one pattern with its categories and sync status
    Show {
        /// Pattern slug
        slug: String,
    },

    /// Permanently delete a pattern
    Rm {
        /// Pattern slug
        slug: String,
    },
}
