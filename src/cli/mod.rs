use clap::{Parser, Subcommand};

mod errors;
mod handlers;
mod validation;

pub use handlers::run;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List bookmarks, newest first
    List {},

    /// Fuzzy search bookmarks by title and url
    Search {
        /// Search query
        query: String,
    },

    /// Show a single bookmark
    Get {
        /// Bookmark id
        id: String,
    },

    /// Add bookmark
    Add {
        /// Bookmark title
        #[clap(short, long)]
        title: String,

        /// a url
        #[clap(short, long)]
        url: String,
    },

    /// Edit bookmark
    Edit {
        /// Bookmark id
        id: String,

        /// Bookmark title
        #[clap(short, long)]
        title: Option<String>,

        /// a url
        #[clap(short, long)]
        url: Option<String>,
    },

    /// Delete bookmark
    Delete {
        /// Bookmark id
        id: String,

        /// Auto confirm
        #[clap(short, long, default_value = "false")]
        yes: bool,
    },
}
