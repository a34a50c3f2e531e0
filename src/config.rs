use clap::{Args, ValueEnum};
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AiProvider {
    Groq,
    Openai,
    /// Offline replies, no network.
    Canned,
}

/// Runtime settings. Every flag can also come from the environment.
#[derive(Debug, Clone, Args)]
pub struct Config {
    /// SQLite database path (`:memory:` for a throwaway store)
    #[arg(long, env = "TRADEPILOT_DB", default_value = "./tradepilot.db", global = true)]
    pub db: String,

    /// Address the HTTP server binds to
    #[arg(long, env = "TRADEPILOT_BIND", default_value = "127.0.0.1:3000", global = true)]
    pub bind: SocketAddr,

    #[arg(long, env = "TRADEPILOT_AI_PROVIDER", value_enum, default_value = "groq", global = true)]
    pub ai_provider: AiProvider,

    #[arg(long, env = "TRADEPILOT_AI_API_KEY", hide_env_values = true, global = true)]
    pub ai_api_key: Option<String>,

    #[arg(long, env = "TRADEPILOT_AI_MODEL", default_value = "llama-3.1-70b-versatile", global = true)]
    pub ai_model: String,

    /// Overrides the provider's API base URL
    #[arg(long, env = "TRADEPILOT_AI_BASE_URL", global = true)]
    pub ai_base_url: Option<String>,

    /// Seed for reproducible synthetic market data
    #[arg(long, env = "TRADEPILOT_MARKET_SEED", global = true)]
    pub market_seed: Option<u64>,

    /// Log level used when RUST_LOG is unset
    #[arg(long, env = "TRADEPILOT_LOG", default_value = "info", global = true)]
    pub log_level: String,
}

impl Config {
    /// In-memory database, offline AI and a fixed market seed.
    pub fn for_tests() -> Self {
        Self {
            db: ":memory:".to_string(),
            bind: SocketAddr::from(([127, 0, 0, 1], 0)),
            ai_provider: AiProvider::Canned,
            ai_api_key: None,
            ai_model: "llama-3.1-70b-versatile".to_string(),
            ai_base_url: None,
            market_seed: Some(42),
            log_level: "warn".to_string(),
        }
    }
}

/// Logs go to stderr so command output on stdout stays machine-readable.
pub fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tradepilot={level},tower_http={level}")));

    // A second init (e.g. from tests) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
