//! Agenda server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) layered under
//! `AGENDA_*` environment variables, opens the SQLite store, optionally seeds
//! it, and serves the JSON API over HTTP.

use std::{path::PathBuf, time::Duration};

use agenda_server::{ServerConfig, assemble, load_config, open_store, seed};
use anyhow::Context as _;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// How long shutdown waits for queued notifications.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Parser)]
#[command(author, version, about = "Agenda appointment booking server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// TOML file of students, psychologists and slots to load at start-up.
  #[arg(long)]
  seed: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let server_cfg: ServerConfig =
    load_config(&cli.config).context("failed to load configuration")?;

  let store = open_store(&server_cfg).await?;
  if let Some(path) = &cli.seed {
    let seed = seed::load(path)?;
    seed::apply(&store, seed).await?;
  }

  let app = assemble(&server_cfg, store)?;
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app.router)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  // The router owned the last notifier handle; the worker now drains and exits.
  match tokio::time::timeout(DRAIN_TIMEOUT, app.notifications).await {
    Ok(Ok(())) => tracing::info!("notifications drained"),
    Ok(Err(e)) => tracing::error!(error = %e, "notification worker failed"),
    Err(_) => tracing::warn!("gave up waiting for queued notifications"),
  }

  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(error = %e, "failed to listen for shutdown signal");
    std::future::pending::<()>().await;
  }
  tracing::info!("shutting down");
}
