//! Command-line interface for kings_valley_server.

use clap::{Parser, Subcommand};

/// King's Valley - server-authoritative match engine
#[derive(Parser, Debug)]
#[command(name = "kings_valley_server")]
#[command(about = "King's Valley game server", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP game server
    Serve {
        /// Path to a TOML config file
        #[arg(short, long)]
        config: Option<std::path::PathBuf>,

        /// Port to bind to (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// SQLite database path (overrides config)
        #[arg(long)]
        database_url: Option<String>,
    },

    /// Print a stored match
    Inspect {
        /// SQLite database path
        #[arg(long, default_value = "kings_valley.db")]
        database_url: String,

        /// Match id or join code
        lookup: String,
    },
}
