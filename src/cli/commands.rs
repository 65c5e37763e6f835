//! CLI command definitions and argument parsing

use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

#[derive(Parser)]
#[command(name = "computeless-rag")]
#[command(about = "Answer questions from a vector store with a language model")]
#[command(version)]
pub struct Cli {
    /// Enable verbose debug logging (default: info level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the configuration file (default: config.toml, then config.example.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Answer a question from retrieved contexts
    Ask {
        /// The question to answer
        query: String,
        /// Also print the retrieved contexts
        #[arg(long)]
        show_contexts: bool,
        /// Print the answer as JSON
        #[arg(long)]
        json: bool,
    },
    /// Store text as a new vector so later questions can retrieve it
    Store {
        /// The text to store
        query: String,
    },
    /// Start the REST API server
    Serve {
        /// Host to bind (default from config)
        #[arg(long)]
        host: Option<String>,
        /// Port to bind (default from config)
        #[arg(short, long)]
        port: Option<u16>,
        /// Enable CORS
        #[arg(long)]
        cors: bool,
    },
    /// Show current configuration
    Config,
}
