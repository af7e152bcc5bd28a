//! HTTP server for the learning diary.
//!
//! Wires the SQLite local store and the optional HTTP document mirror into an
//! [`EntryStore`], and serves [`diary_api`] under `/api`.

pub mod error;

pub use error::{Error, Result};

use std::{
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use axum::Router;
use diary_api::{ApiState, api_router};
use diary_core::{
  calendar::Semester,
  notice::{Notice, NoticeLevel},
  persist::{LocalStore, RemoteStore},
  store::{EntryStore, StoreOptions},
};
use diary_remote::{HttpRemote, RemoteConfig};
use diary_store_sqlite::SqliteStore;
use serde::Deserialize;
use tokio::{sync::broadcast::error::RecvError, task::JoinHandle};
use tower_http::trace::TraceLayer;

/// The store the server runs on.
pub type DiaryStore = EntryStore<SqliteStore, HttpRemote>;

// ─── Configuration ───────────────────────────────────────────────────────────

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 8080 }

fn default_store_path() -> PathBuf { PathBuf::from("~/.local/share/learning-diary/diary.sqlite") }

fn default_remote_wait_ms() -> u64 { 3000 }

/// Runtime server configuration, deserialised from `config.toml` and
/// `DIARY_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:           String,
  #[serde(default = "default_port")]
  pub port:           u16,
  #[serde(default = "default_store_path")]
  pub store_path:     PathBuf,
  #[serde(default)]
  pub semester:       Semester,
  /// Document service to mirror to. Absent means local-only.
  #[serde(default)]
  pub remote:         Option<RemoteConfig>,
  /// How long startup waits for the remote document.
  #[serde(default = "default_remote_wait_ms")]
  pub remote_wait_ms: u64,
}

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn store_options(&self) -> StoreOptions {
    StoreOptions { remote_wait: Duration::from_millis(self.remote_wait_ms) }
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// Open the SQLite file at `store_path`, connect the mirror if one is
/// configured, and load the initial collection.
pub async fn open_store(config: &ServerConfig, store_path: &Path) -> Result<DiaryStore> {
  let local = SqliteStore::open(store_path).await?;
  let remote = config.remote.as_ref().map(HttpRemote::new).transpose()?;
  if let Some(remote) = &remote {
    tracing::info!(url = remote.url(), "mirroring to remote document");
  }
  Ok(EntryStore::open(local, remote, config.store_options()).await?)
}

/// Log the startup notices, then every later notice until the store is
/// dropped.
pub fn spawn_notice_logger<L, R>(store: &Arc<EntryStore<L, R>>) -> JoinHandle<()>
where
  L: LocalStore + 'static,
  R: RemoteStore + 'static,
{
  for notice in store.startup_notices() {
    log_notice(notice);
  }

  let mut notices = store.subscribe();
  tokio::spawn(async move {
    loop {
      match notices.recv().await {
        Ok(notice) => log_notice(&notice),
        Err(RecvError::Lagged(skipped)) => tracing::warn!(skipped, "notice logger fell behind"),
        Err(RecvError::Closed) => break,
      }
    }
  })
}

fn log_notice(notice: &Notice) {
  match notice.level() {
    NoticeLevel::Success | NoticeLevel::Info => tracing::info!(target: "diary::notice", "{notice}"),
    NoticeLevel::Error => tracing::warn!(target: "diary::notice", "{notice}"),
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the server's axum [`Router`].
pub fn router<L, R>(store: Arc<EntryStore<L, R>>, semester: Semester) -> Router
where
  L: LocalStore + 'static,
  R: RemoteStore + 'static,
{
  Router::new()
    .nest("/api", api_router(ApiState::new(store, semester)))
    .layer(TraceLayer::new_for_http())
}

// ─── Integration tests ───────────────────────────────────────────────────────
