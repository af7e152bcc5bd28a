//! [`SqliteStore`]: the SQLite implementation of [`LocalStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use diary_core::{
  entry::Entry,
  persist::{LocalStore, decode_local, encode_local},
};

use crate::{Result, schema::SCHEMA};

/// Key under which the entry collection is stored.
pub const ENTRIES_KEY: &str = "diaryEntries";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A diary document store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Read the raw value stored under `key`.
  pub async fn get_raw(&self, key: &str) -> Result<Option<String>> {
    let key = key.to_owned();

    let value: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT value FROM kv WHERE key = ?1",
              rusqlite::params![key],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    Ok(value)
  }

  /// Insert or overwrite the raw value stored under `key`.
  pub async fn put_raw(&self, key: &str, value: String) -> Result<()> {
    let key = key.to_owned();
    let at_str = Utc::now().to_rfc3339();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
           ON CONFLICT(key) DO UPDATE SET
             value      = excluded.value,
             updated_at = excluded.updated_at",
          rusqlite::params![key, value, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(())
  }
}

// ─── LocalStore impl ─────────────────────────────────────────────────────────

impl LocalStore for SqliteStore {
  type Error = crate::Error;

  async fn load(&self) -> Result<Vec<Entry>> {
    let raw = self.get_raw(ENTRIES_KEY).await?;
    let entries = raw.as_deref().and_then(decode_local).unwrap_or_default();
    tracing::debug!(entries = entries.len(), "loaded local diary document");
    Ok(entries)
  }

  async fn save(&self, entries: &[Entry]) -> Result<()> {
    let encoded = encode_local(entries)?;
    self.put_raw(ENTRIES_KEY, encoded).await
  }
}
