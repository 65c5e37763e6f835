use clap::Parser;
use computeless_rag::cli::handle_ask;
use computeless_rag::cli::handle_config;
use computeless_rag::cli::handle_serve;
use computeless_rag::cli::handle_store;
use computeless_rag::cli::Cli;
use computeless_rag::cli::Commands;
use computeless_rag::config::AppConfig;
use computeless_rag::logging;
use computeless_rag::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::load()?,
    };

    if cli.verbose {
        logging::init_logging_with_level("debug")?;
    } else {
        logging::init_logging_with_config(Some(&config))?;
    }

    match cli.command {
        Commands::Ask {
            query,
            show_contexts,
            json,
        } => handle_ask(&config, &query, show_contexts, json).await,
        Commands::Store { query } => handle_store(&config, &query).await,
        Commands::Serve { host, port, cors } => handle_serve(&config, host, port, cors).await,
        Commands::Config => handle_config(&config),
    }
}
