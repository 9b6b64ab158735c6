//! Wiring for the Agenda server binary: configuration, seeding and
//! assembly of the store, notification worker and HTTP router.

pub mod seed;

use std::{
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use agenda_booking::{Booking, NotificationDispatcher, Templates};
use agenda_mail::{LogChannel, Mailer, ResendChannel, ResendConfig};
use agenda_store_sqlite::SqliteStore;
use anyhow::{Context as _, anyhow};
use axum::Router;
use chrono::FixedOffset;
use serde::Deserialize;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `AGENDA_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:             String,
  #[serde(default = "default_port")]
  pub port:             u16,
  #[serde(default = "default_store_path")]
  pub store_path:       PathBuf,
  /// Deadline for a single store call.
  #[serde(default = "default_store_timeout_ms")]
  pub store_timeout_ms: u64,
  #[serde(default)]
  pub mail:             MailConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MailConfig {
  /// Resend API key. Without one, messages are only logged.
  pub api_key:            Option<String>,
  pub sender:             String,
  pub base_url:           String,
  pub brand:              String,
  /// Offset appointment times are rendered in.
  pub utc_offset_minutes: i32,
}

impl Default for MailConfig {
  fn default() -> Self {
    Self {
      api_key:            None,
      sender:             "Agenda <onboarding@resend.dev>".to_string(),
      base_url:           agenda_mail::DEFAULT_BASE_URL.to_string(),
      brand:              "Agenda".to_string(),
      utc_offset_minutes: 0,
    }
  }
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 8080 }

fn default_store_path() -> PathBuf { PathBuf::from("agenda.db") }

fn default_store_timeout_ms() -> u64 { 5_000 }

/// Layer `path` (optional) under `AGENDA_*` environment variables; nested keys
/// use `__`, e.g. `AGENDA_MAIL__API_KEY`.
pub fn load_config(path: &Path) -> Result<ServerConfig, config::ConfigError> {
  config::Config::builder()
    .add_source(config::File::from(path).required(false))
    .add_source(
      config::Environment::with_prefix("AGENDA")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true),
    )
    .build()?
    .try_deserialize()
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

impl MailConfig {
  /// Resend when an API key is set, otherwise the log-only channel.
  pub fn mailer(&self) -> anyhow::Result<Mailer> {
    let Some(api_key) = self.api_key.as_deref().filter(|k| !k.trim().is_empty()) else {
      return Ok(Mailer::Log(LogChannel));
    };
    let mut config = ResendConfig::new(api_key, self.sender.clone());
    config.base_url = self.base_url.clone();
    let channel = ResendChannel::new(config).context("failed to build mail client")?;
    Ok(Mailer::Resend(channel))
  }

  pub fn templates(&self) -> anyhow::Result<Templates> {
    let offset = FixedOffset::east_opt(self.utc_offset_minutes * 60).ok_or_else(|| {
      anyhow!("mail.utc_offset_minutes out of range: {}", self.utc_offset_minutes)
    })?;
    Ok(Templates::new(self.brand.clone(), offset))
  }
}

// ─── Assembly ─────────────────────────────────────────────────────────────────

/// A ready-to-serve application.
pub struct App {
  pub router:        Router,
  /// Completes once the router is dropped and queued notifications are done.
  pub notifications: JoinHandle<()>,
}

/// Open (or create) the SQLite store named by `store_path`.
pub async fn open_store(config: &ServerConfig) -> anyhow::Result<Arc<SqliteStore>> {
  let store_path = expand_tilde(&config.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  Ok(Arc::new(store))
}

/// Wire booking, notifications and HTTP around an open store. Must be called
/// inside a tokio runtime.
pub fn assemble(config: &ServerConfig, store: Arc<SqliteStore>) -> anyhow::Result<App> {
  let mailer = config.mail.mailer()?;
  tracing::info!(channel = mailer.name(), "notification channel ready");

  let (notifier, notifications) = NotificationDispatcher::new(
    Arc::clone(&store),
    Arc::clone(&store),
    Arc::new(mailer),
    config.mail.templates()?,
  )
  .spawn();

  let booking = Booking::new(store, notifier)
    .with_store_timeout(Duration::from_millis(config.store_timeout_ms));
  let router = agenda_api::api_router(Arc::new(booking)).layer(TraceLayer::new_for_http());

  Ok(App { router, notifications })
}
