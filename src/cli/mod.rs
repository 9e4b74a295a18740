//! CLI definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

/// Leafpress CLI - Atomic note publishing to GitHub-backed sites
#[derive(Parser, Debug)]
#[command(name = "lp", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Database path (default: ~/.leafpress/leafpress.db)
    #[arg(long, global = true, env = "LP_DB")]
    pub db: Option<PathBuf>,

    /// Environment variable to read the API token from
    #[arg(long, global = true)]
    pub token_env: Option<String>,

    /// Output as JSON (for agent integration)
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a leafpress.json config in the current directory
    Init {
        /// Repository owner (user or org)
        #[arg(long)]
        owner: String,

        /// Repository name
        #[arg(long)]
        repo: String,

        /// Branch to publish to
        #[arg(long, default_value = "main")]
        branch: String,

        /// Repository subtree to publish into (e.g. content/blog)
        #[arg(long)]
        target: String,

        /// Source directory of notes, relative to the config
        #[arg(long, default_value = "notes")]
        source: String,

        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },

    /// Classify notes against the last publish baseline
    Status,

    /// Publish the source directory as one atomic commit
    Publish {
        /// Commit message
        #[arg(short, long, default_value = "Publish notes")]
        message: String,

        /// Retries on ref conflict (full sequence restarts)
        #[arg(long, default_value = "2")]
        retries: u32,

        /// Preview what would be published without committing
        #[arg(long)]
        dry_run: bool,
    },

    /// Single-file operations against the contents API
    File {
        #[command(subcommand)]
        command: FileCommands,
    },

    /// Print version information
    Version,

    /// Generate shell completions
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum FileCommands {
    /// Fetch a file; prints its content, or reports absence
    Get {
        /// Repository-relative path
        path: String,

        /// Write content to a local file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Create or update a file from a local source
    Put {
        /// Repository-relative path
        path: String,

        /// Local file to upload
        file: PathBuf,

        /// Commit message
        #[arg(short, long, default_value = "Update file")]
        message: String,
    },

    /// Delete a file
    Rm {
        /// Repository-relative path
        path: String,

        /// Commit message
        #[arg(short, long, default_value = "Delete file")]
        message: String,
    },
}
