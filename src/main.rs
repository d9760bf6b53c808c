//! Routevault - REST backend for users, submitted routes and favorite routes

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use routevault::api::{self, AppState};
use routevault::config::Config;
use routevault::store::Database;

#[derive(Parser)]
#[command(name = "routevault")]
#[command(about = "REST backend for users, submitted routes and favorite routes")]
#[command(version)]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port to listen on (overrides config and PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Create the database file and apply the schema
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            format!("routevault={},tower_http=debug", log_level).into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    let _ = dotenvy::dotenv();

    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { port } => {
            let port = port.unwrap_or(config.port);
            let state = AppState::from_config(&config)?;

            if state.delete_key.is_none() {
                tracing::warn!("DELETE_KEY not set; deleting all routes is disabled");
            }
            tracing::info!("Starting HTTP server on port {}", port);

            let router = api::create_router(state);
            let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

            println!("Routevault server running at http://localhost:{}", port);
            println!("  Database: {}", config.db_path().display());
            println!("  API Docs: http://localhost:{}/api/docs", port);
            println!("  Health:   http://localhost:{}/health", port);

            axum::serve(listener, router).await?;
        }

        Commands::Migrate => {
            Database::open(&config)?;
            println!("✓ Schema applied to {}", config.db_path().display());
        }
    }

    Ok(())
}
