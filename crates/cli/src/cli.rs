//! CLI definitions for pdc.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Personal Data Collector CLI.
#[derive(Parser)]
#[command(name = "pdc")]
#[command(about = "Capture, deduplicate, export and sync web pages and notes")]
#[command(version)]
pub(crate) struct Cli {
    /// SQLite database path (overrides PDC_DB_PATH and the config file)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Capture a page from a URL or a saved HTML file
    Capture {
        /// URL to fetch, or path to an HTML file
        source: String,

        /// Title to use instead of the one found in the page
        #[arg(short, long)]
        title: Option<String>,

        /// Source URL recorded for an HTML file
        #[arg(long)]
        url: Option<String>,

        /// Offer a naming prompt for this many seconds after capture
        #[arg(long, value_name = "SECONDS")]
        name_within: Option<u32>,
    },

    /// Store text read from stdin as a note
    Paste {
        /// Note title (default: "Note - <date>")
        #[arg(short, long)]
        title: Option<String>,
    },

    /// List stored records, newest first
    List {
        /// Maximum number of records to show
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rename the record with the given hash
    Rename {
        /// Record hash
        hash: String,

        /// New title
        title: String,
    },

    /// Delete the record at a list index
    Delete {
        /// Index as shown by `pdc list` (0 = newest)
        index: usize,
    },

    /// Export all records
    Export {
        /// Output format (md, txt, json, bundle)
        #[arg(short, long, default_value = "md")]
        format: String,

        /// Output file, or directory for bundles (default: stdout)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Wrap JSON output with export timestamp, version and count
        #[arg(long)]
        envelope: bool,
    },

    /// Send a record to Notion, or test the configured connection
    Sync {
        /// Record hash
        #[arg(required_unless_present = "test")]
        hash: Option<String>,

        /// Only verify the Notion credentials
        #[arg(long, conflicts_with = "hash")]
        test: bool,
    },

    /// Show record count, capacity and storage use
    Stats,

    /// Handle JSON action messages from stdin, one per line
    Message,
}
