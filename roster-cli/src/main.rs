//! # parley-roster
//!
//! Command-line front-end for the Parley chat roster.
//!
//! ## Commands
//!
//! - `login`: Store a session token
//! - `logout`: Forget the session
//! - `list`: Show recent conversations and people to talk to
//! - `start`: Start or resume a conversation with a user
//! - `open`: Open an existing conversation
//! - `status`: Show data dir, backend and session
//!
//! ## Example
//!
//! ```bash
//! # Store the token from the backend's login endpoint
//! parley-roster login --token eyJhbGciOi... --user-id 65f0c2
//!
//! # See the roster
//! parley-roster list
//!
//! # Talk to someone
//! parley-roster start 65f0d9
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod store;

use commands::{build_client, list, session, start, status};

/// Command-line front-end for the Parley chat roster.
#[derive(Parser, Debug)]
#[command(name = "parley-roster")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Data directory for the session and config files
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Config file (default: roster.toml in the data directory, if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL, overriding the config file
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Store a session token
    Login {
        /// Bearer token issued by the backend
        #[arg(long)]
        token: String,

        /// Id of the signed-in user
        #[arg(long)]
        user_id: String,

        /// Display name of the signed-in user
        #[arg(long)]
        name: Option<String>,
    },

    /// Forget the session
    Logout,

    /// Show recent conversations and people to talk to
    List,

    /// Start or resume a conversation with a user
    Start {
        /// Id of the other user
        user_id: String,
    },

    /// Open an existing conversation
    Open {
        /// Id of the conversation
        conversation_id: String,
    },

    /// Show data dir, backend and session
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    // Determine data directory
    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => default_data_dir()?,
    };

    // Ensure data directory exists
    tokio::fs::create_dir_all(&data_dir)
        .await
        .context("Failed to create data directory")?;

    let mut config = store::load_config(&data_dir, cli.config.as_deref())?;
    if let Some(url) = cli.api_url.as_deref() {
        config = config.with_base_url(url);
        config.validate()?;
    }

    match cli.command {
        Commands::Login {
            token,
            user_id,
            name,
        } => {
            session::login(&data_dir, &token, &user_id, name.as_deref()).await?;
        }
        Commands::Logout => {
            session::logout(&data_dir).await?;
        }
        Commands::List => {
            list::run(&build_client(&data_dir, &config)).await?;
        }
        Commands::Start { user_id } => {
            start::run(&build_client(&data_dir, &config), &user_id).await?;
        }
        Commands::Open { conversation_id } => {
            start::open(&build_client(&data_dir, &config), &conversation_id)?;
        }
        Commands::Status => {
            status::run(&data_dir, &config)?;
        }
    }

    Ok(())
}

/// Get the default data directory for parley-roster.
fn default_data_dir() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("chat", "parley", "parley-roster")
        .context("Could not determine home directory")?;
    Ok(dirs.data_dir().to_path_buf())
}
