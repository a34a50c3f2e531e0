use clap::Parser;
use serde::Serialize;
use std::sync::Arc;
use tradepilot::api;
use tradepilot::api::market::parse_symbols;
use tradepilot::cli::commands::{Cli, Commands};
use tradepilot::config::init_tracing;
use tradepilot::domain::entities::chat::ChatRequest;
use tradepilot::domain::values::chat_mode::ChatMode;
use tradepilot::domain::values::difficulty::Difficulty;
use tradepilot::domain::values::history_period::HistoryPeriod;
use tradepilot::TradePilot;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.config.log_level);

    let app = match TradePilot::new(&cli.config) {
        Ok(app) => Arc::new(app),
        Err(e) => {
            eprintln!("Error initializing tradepilot: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run_command(app, cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run_command(app: Arc<TradePilot>, cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Serve => {
            api::serve(app, cli.config.bind).await?;
        }
        Commands::Quote { symbols } => {
            let symbols: Vec<String> = symbols.iter().flat_map(|s| parse_symbols(s)).collect();
            print_json(&app.market().get_multiple_quotes(&symbols)?)?;
        }
        Commands::History { symbol, period } => {
            let period = period.parse::<HistoryPeriod>()?;
            print_json(&app.market().get_historical_data(&symbol.to_uppercase(), period)?)?;
        }
        Commands::News { symbols, limit } => {
            let symbols = symbols.as_deref().map(parse_symbols);
            print_json(&app.market().get_market_news(symbols.as_deref(), limit)?)?;
        }
        Commands::Search { query } => {
            print_json(&app.market().search_symbols(&query))?;
        }
        Commands::Concepts { difficulty } => match difficulty {
            Some(d) => {
                let difficulty = d.parse::<Difficulty>()?;
                print_json(&app.learning().concepts_by_difficulty(difficulty))?;
            }
            None => print_json(&app.learning().all_concepts())?,
        },
        Commands::Scenarios => {
            print_json(&app.training().scenarios())?;
        }
        Commands::Chat { message, mode, user } => {
            let mode = mode.parse::<ChatMode>()?;
            let request = ChatRequest {
                message,
                mode,
                history: vec![],
                assistant: None,
            };
            print_json(&app.chat(user.as_deref(), request).await?)?;
        }
        Commands::Status => {
            print_json(&app.market().get_market_status())?;
        }
    }
    Ok(())
}
