use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "posts")]
#[command(version, about = "List and edit posts on a posts service")]
pub struct Cli {
    /// Service base URL (defaults to $POSTS_API_URL, then http://127.0.0.1:3000)
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Per-request timeout in milliseconds (no timeout when unset)
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show every post
    List,

    /// Publish a new post
    Create {
        #[arg(long)]
        date: String,

        #[arg(long)]
        title: String,

        /// Display reading time, e.g. "3 minutos"
        #[arg(long)]
        read_time: String,
    },

    /// Edit a post; omitted fields keep their current value
    Update {
        id: String,

        #[arg(long)]
        date: Option<String>,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        read_time: Option<String>,
    },

    /// Delete a post
    Delete {
        id: String,

        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
}
