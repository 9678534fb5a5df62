//! CLI argument parsing for projectstore

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ps")]
#[command(author, version, about = "Inspect a projectstore database", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the collections present in the store
    Collections,

    /// List records in a collection
    List {
        /// Collection name
        #[arg(required = true)]
        collection: String,
    },

    /// Show a record's JSON payload
    Show {
        /// Collection name
        #[arg(required = true)]
        collection: String,

        /// Record ID
        #[arg(required = true)]
        id: String,
    },

    /// Delete a record
    Delete {
        /// Collection name
        #[arg(required = true)]
        collection: String,

        /// Record ID
        #[arg(required = true)]
        id: String,
    },
}
