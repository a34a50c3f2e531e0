use crate::config::Config;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tradepilot", version, about = "AI trading assistant backend")]
pub struct Cli {
    #[command(flatten)]
    pub config: Config,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API server
    Serve,
    /// Current quotes for one or more symbols
    Quote {
        #[arg(required = true)]
        symbols: Vec<String>,
    },
    /// Daily bars for a symbol
    History {
        symbol: String,
        /// 1d, 5d, 1m, 3m or 1y
        #[arg(long, default_value = "1m")]
        period: String,
    },
    /// Synthetic market headlines
    News {
        /// Comma-separated symbols
        #[arg(long)]
        symbols: Option<String>,
        #[arg(long, default_value = "10")]
        limit: usize,
    },
    /// Look up symbols by ticker or name
    Search { query: String },
    /// List learning concepts
    Concepts {
        /// beginner, intermediate or advanced
        #[arg(long)]
        difficulty: Option<String>,
    },
    /// List practice trading scenarios
    Scenarios,
    /// Send one message to the assistant
    Chat {
        message: String,
        /// chat, learning or trading
        #[arg(long, default_value = "chat")]
        mode: String,
        /// Account id used for persona lookup and activity logging
        #[arg(long)]
        user: Option<String>,
    },
    /// Whether the US market is open
    Status,
}
