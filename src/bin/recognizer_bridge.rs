//! # Recognizer Bridge
//!
//! Serves the sync trigger over HTTP, or performs a single unguarded run
//! from the command line and prints its report.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::process;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use recognizer_bridge::config::BridgeConfig;
use recognizer_bridge::logging::{init_structured_logging, log_error};
use recognizer_bridge::web::{self, state::build_driver, AppState};

#[derive(Parser)]
#[command(name = "recognizer-bridge")]
#[command(about = "Synchronize unprocessed line images with the recognition daemon")]
#[command(
    long_about = "Synchronize unprocessed line images with the recognition daemon.\n\n\
    Runs are not coordinated with each other: trigger at most one run at a time."
)]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Subcommands
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the HTTP trigger (default)
    Serve {
        /// Address to bind, overrides BIND_ADDRESS
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Perform one run without authorization and print the report as JSON
    RunOnce {
        /// Pretty-print the report
        #[arg(long)]
        pretty: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_structured_logging();

    let result = match cli.command.unwrap_or(Commands::Serve { bind: None }) {
        Commands::Serve { bind } => serve(bind).await.map(|()| true),
        Commands::RunOnce { pretty } => run_once(pretty).await,
    };

    match result {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(err) => {
            log_error("recognizer_bridge", "main", &format!("{err:#}"), None);
            eprintln!("❌ {err:#}");
            process::exit(2);
        }
    }
}

fn load_config() -> anyhow::Result<BridgeConfig> {
    BridgeConfig::from_env().context("failed to load configuration")
}

async fn serve(bind: Option<String>) -> anyhow::Result<()> {
    let mut config = load_config()?;
    if let Some(bind) = bind {
        config.web.bind_address = bind;
    }
    if !config.auth.enabled {
        warn!("Trigger authorization is disabled");
    }

    let state = Arc::new(AppState::from_config(Arc::new(config.clone()))?);
    let listener = TcpListener::bind(&config.web.bind_address)
        .await
        .with_context(|| format!("failed to bind {}", config.web.bind_address))?;

    web::serve(listener, state, shutdown_signal())
        .await
        .context("web server failed")?;

    info!("Recognizer bridge stopped");
    Ok(())
}

/// Returns whether the run drained the queue
async fn run_once(pretty: bool) -> anyhow::Result<bool> {
    let config = load_config()?;
    let driver = build_driver(&config)?;

    let report = driver.execute(driver.prepare_unguarded()).await;
    let rendered = if pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{rendered}");

    Ok(report.is_drained())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log_error(
            "recognizer_bridge",
            "shutdown_signal",
            &err.to_string(),
            Some("failed to listen for ctrl-c"),
        );
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
