//! Persistence traits and the document shapes they exchange.
//!
//! The store depends on two capabilities: a local store that is always present
//! and is the ground truth for durability, and an optional remote mirror that
//! may be slow or unreachable. Backends live in their own crates
//! (`diary-store-sqlite`, `diary-remote`); in-memory versions are in
//! [`crate::memory`].

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::entry::Entry;

// ─── Documents ───────────────────────────────────────────────────────────────

/// The remote document: one record per user holding the whole collection.
///
/// A document without an `entries` key is read as an empty collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteDocument {
  #[serde(default)]
  pub entries: Vec<Entry>,
}

/// Encode the local document: a bare JSON array of entries.
pub fn encode_local(entries: &[Entry]) -> serde_json::Result<String> {
  serde_json::to_string(entries)
}

/// Decode the local document. Corrupt or mis-shaped data yields `None` so the
/// caller can treat it as "no data" rather than failing startup.
pub fn decode_local(raw: &str) -> Option<Vec<Entry>> {
  match serde_json::from_str(raw) {
    Ok(entries) => Some(entries),
    Err(e) => {
      tracing::warn!(error = %e, "discarding malformed local diary document");
      None
    }
  }
}

// ─── Traits ──────────────────────────────────────────────────────────────────

/// Always-available local storage for the full collection.
///
/// `save` must either make the collection durable or return an error; the
/// store reports a failed local save as a failed operation.
pub trait LocalStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Load the stored collection. An absent or malformed document loads as an
  /// empty collection; only I/O failures are errors.
  fn load(&self) -> impl Future<Output = Result<Vec<Entry>, Self::Error>> + Send + '_;

  /// Replace the stored collection with `entries`.
  fn save<'a>(
    &'a self,
    entries: &'a [Entry],
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

/// Optional remote mirror of the same collection.
///
/// Every call may fail; the store never lets a remote failure undo or block
/// local state.
pub trait RemoteStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Fetch the user's document. `Ok(None)` means the document does not exist
  /// yet, which is different from an empty collection.
  fn load(
    &self,
  ) -> impl Future<Output = Result<Option<Vec<Entry>>, Self::Error>> + Send + '_;

  /// Overwrite the user's document with `entries`.
  fn save<'a>(
    &'a self,
    entries: &'a [Entry],
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

/// Placeholder remote for stores opened without a mirror.
///
/// It is never called: [`crate::store::EntryStore::local_only`] stores it as
/// `None`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRemote;

impl RemoteStore for NoRemote {
  type Error = std::convert::Infallible;

  async fn load(&self) -> Result<Option<Vec<Entry>>, Self::Error> { Ok(None) }

  async fn save(&self, _entries: &[Entry]) -> Result<(), Self::Error> { Ok(()) }
}
