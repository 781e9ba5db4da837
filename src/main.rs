//! # Rank Tracker CLI (`rtrack`)
//!
//! ## Usage
//!
//! ```bash
//! rtrack --config ./config/rank-tracker.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `rtrack init` | Create the SQLite database and schema |
//! | `rtrack keyword add <keyword> <url>` | Start tracking a keyword |
//! | `rtrack keyword list` | List keywords with their latest position |
//! | `rtrack keyword remove <id>` | Stop tracking a keyword |
//! | `rtrack check` | Run the ranking check for all keywords |
//! | `rtrack history` | Print ranking history per keyword |
//! | `rtrack serve` | Start the HTTP API |
//!
//! The search API credentials are read from `GOOGLE_API_KEY` and
//! `GOOGLE_SEARCH_ENGINE_ID`; the optional check trigger secret from
//! `CRON_SECRET`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use rank_tracker::{check, config, history, keywords, migrate, server};

/// Rank Tracker — track where a URL ranks in search results over time.
#[derive(Parser)]
#[command(
    name = "rtrack",
    about = "Rank Tracker — track where a URL ranks in search results over time",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/rank-tracker.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and the keywords and rankings
    /// tables. Running it again is safe.
    Init,

    /// Manage tracked keywords.
    Keyword {
        #[command(subcommand)]
        action: KeywordAction,
    },

    /// Check the ranking of every tracked keyword now.
    ///
    /// Searches each keyword in turn, pausing between requests, and stores
    /// a ranking whenever the target URL is on the first result page.
    /// Keywords that fail are reported and skipped.
    Check {
        /// Print the full report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print ranking history for every keyword, oldest first.
    History {
        /// Maximum number of points per keyword (defaults to `[history].limit`).
        #[arg(long)]
        limit: Option<i64>,
    },

    /// Start the HTTP API on `[server].bind`.
    Serve,
}

#[derive(Subcommand)]
enum KeywordAction {
    /// Track a new keyword.
    Add {
        /// Search phrase (unique, case-sensitive).
        keyword: String,
        /// URL whose position is tracked.
        target_url: String,
    },
    /// List keywords with their latest ranking.
    List,
    /// Stop tracking a keyword and delete its history.
    Remove {
        /// Keyword id as shown by `rtrack keyword list`.
        id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Keyword { action } => match action {
            KeywordAction::Add {
                keyword,
                target_url,
            } => {
                keywords::run_add(&cfg, &keyword, &target_url).await?;
            }
            KeywordAction::List => {
                keywords::run_list(&cfg).await?;
            }
            KeywordAction::Remove { id } => {
                keywords::run_remove(&cfg, &id).await?;
            }
        },
        Commands::Check { json } => {
            check::run_check_cmd(&cfg, json).await?;
        }
        Commands::History { limit } => {
            history::run_history(&cfg, limit).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
