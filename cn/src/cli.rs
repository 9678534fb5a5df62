//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ConceptNote - staged concept-note generation pipeline
#[derive(Parser)]
#[command(
    name = "cn",
    about = "Turns a short project description into a client-ready concept note",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start a session from a project description
    New {
        /// Free-text project description
        description: String,

        /// Points to emphasize during generation
        #[arg(long)]
        highlights: Option<String>,

        /// Supporting document to attach (plain text)
        #[arg(long, value_name = "FILE")]
        attach: Vec<PathBuf>,
    },

    /// Answer the pre-stage questions
    AnswerPre {
        /// Session id
        session_id: String,

        /// Answers in question order; pass "" to skip one
        answers: Vec<String>,
    },

    /// Generate the formatted preview
    Preview {
        /// Session id
        session_id: String,
    },

    /// Ask for the next clarification question
    Clarify {
        /// Session id
        session_id: String,
    },

    /// Answer the pending clarification question
    Answer {
        /// Session id
        session_id: String,

        /// The answer text
        answer: String,
    },

    /// Generate (or fetch the cached) recommendations
    Recommend {
        /// Session id
        session_id: String,
    },

    /// Generate the final concept note
    Finalize {
        /// Session id
        session_id: String,

        /// Edited internal recommendation text to use instead of the cached one
        #[arg(long)]
        internal: Option<String>,

        /// Edited external recommendation text to use instead of the cached one
        #[arg(long)]
        external: Option<String>,
    },

    /// Render the final document to a file
    Export {
        /// Session id
        session_id: String,

        /// Output path
        #[arg(short, long, default_value = "concept-note.txt")]
        output: PathBuf,
    },

    /// List all sessions
    List,

    /// Show one session's full state
    Show {
        /// Session id
        session_id: String,
    },
}
