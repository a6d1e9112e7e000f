use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use coursecal_core::config::CalendarConfig;
use coursecal_store::SqliteStore;
use tracing::info;

mod app;
mod http;
mod seed;

#[derive(Debug, Parser)]
#[command(name = "coursecal-gateway", version, about = "Course calendar HTTP API")]
struct Cli {
    /// Config file (default: $COURSECAL_CONFIG, then ~/.coursecal/coursecal.toml).
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default).
    Serve,
    /// Import courses from a JSON array file into the database.
    Seed { file: PathBuf },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "coursecal_gateway=info,coursecal_store=info,tower_http=debug".into()
            }),
        )
        .init();

    let cli = Cli::parse();

    // config: --config > COURSECAL_CONFIG env > ~/.coursecal/coursecal.toml
    let config_path = cli
        .config
        .clone()
        .or_else(|| std::env::var("COURSECAL_CONFIG").ok());
    let config = load_config(config_path.as_deref())?;
    let format = config.dates.day_format()?;

    let db_path = config.database.path.clone();
    ensure_parent_dir(&db_path);
    let store = SqliteStore::open(&db_path, format.clone())
        .with_context(|| format!("opening database {db_path}"))?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Seed { file } => {
            let reader = std::fs::File::open(&file)
                .with_context(|| format!("opening {}", file.display()))?;
            let count = seed::seed_from_reader(std::io::BufReader::new(reader), &store, &format)?;
            info!(count, file = %file.display(), "seed complete");
            Ok(())
        }
        Command::Serve => serve(config, format, store).await,
    }
}

async fn serve(
    config: CalendarConfig,
    format: coursecal_core::DayFormat,
    store: SqliteStore,
) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port).parse()?;
    let state = Arc::new(app::AppState::new(config, format, Box::new(store)));
    let router = app::build_router(state);

    info!("Course calendar listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}

/// Load settings; a missing file means defaults, but an unreadable or
/// invalid one stops startup since it decides which database is opened and
/// how its dates are read.
fn load_config(path: Option<&str>) -> anyhow::Result<CalendarConfig> {
    CalendarConfig::load(path)
        .with_context(|| format!("loading config {}", path.unwrap_or("(default path)")))
}

/// Ensure the parent directory for a file path exists.
fn ensure_parent_dir(path: &str) {
    if let Some(parent) = std::path::Path::new(path).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
}
