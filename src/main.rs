use anyhow::Context;
use clap::{Parser, Subcommand};
use configuration::{LoggingSettings, Settings};
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// The main entry point for the Vacina Brasil statistics API.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A .env file is optional; real deployments set the variables directly.
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    // Refuse to start without a usable configuration (DATABASE_URL above all).
    let settings = configuration::load_config().context("failed to load configuration")?;
    let _log_guards = init_tracing(&settings.logging)?;

    // Execute the appropriate command
    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(settings).await,
        Commands::Seed => seed(settings).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Read-only HTTP API for vaccination statistics.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Clone, Copy)]
enum Commands {
    /// Serve the statistics API (the default).
    Serve,
    /// Create the statistics tables and insert sample rows into empty ones.
    Seed,
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn serve(settings: Settings) -> anyhow::Result<()> {
    let db = database::connect(&settings.database)?;
    web_server::run_server(&settings.server, Arc::new(db)).await
}

async fn seed(settings: Settings) -> anyhow::Result<()> {
    let db = database::connect(&settings.database)?;
    let report = database::bootstrap(&db).await.context("database bootstrap failed")?;
    tracing::info!(
        snapshots = report.snapshots_inserted,
        timeseries = report.timeseries_inserted,
        "Tables checked/created successfully."
    );
    Ok(())
}

/// Installs the global subscriber: stdout always, plus a daily rolling file
/// when a log directory is configured. The returned guards flush on drop.
fn init_tracing(logging: &LoggingSettings) -> anyhow::Result<Vec<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let mut guards = Vec::new();

    let (stdout_writer, stdout_guard) = tracing_appender::non_blocking(std::io::stdout());
    guards.push(stdout_guard);

    let file_layer = match &logging.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, "vacina.log");
            let (file_writer, file_guard) = tracing_appender::non_blocking(appender);
            guards.push(file_guard);
            Some(fmt::layer().with_ansi(false).with_writer(file_writer))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(stdout_writer))
        .with(file_layer)
        .try_init()
        .context("failed to install the tracing subscriber")?;

    Ok(guards)
}
