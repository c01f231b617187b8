use crate::transport::DEFAULT_SERVER_URL;
use clap::{Parser, Subcommand};

/// WhisperNotes command-line client.
#[derive(Debug, Parser)]
#[command(name = "whispernotes", version, about)]
pub struct Cli {
    /// Base URL of the WhisperNotes API
    #[arg(long, env = "WHISPERNOTES_URL", default_value = DEFAULT_SERVER_URL, global = true)]
    pub server: String,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show note cards, optionally filtered
    List {
        /// Case-insensitive text in title or content
        #[arg(long, default_value = "")]
        search: String,
        /// Only notes carrying this tag (`all` for any)
        #[arg(long)]
        tag: Option<String>,
    },
    /// Show every tag in use
    Tags,
    /// Create a note
    Add {
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long, default_value = "")]
        content: String,
        /// Comma separated
        #[arg(long, default_value = "")]
        tags: String,
    },
    /// Change fields of an existing note
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        /// Comma separated; replaces all tags
        #[arg(long)]
        tags: Option<String>,
    },
    /// Delete a note
    Rm { id: String },
    /// Preview palettes and change the active theme
    Themes {
        #[arg(long)]
        select: Option<String>,
        #[arg(long, conflicts_with = "light")]
        dark: bool,
        #[arg(long)]
        light: bool,
    },
}
