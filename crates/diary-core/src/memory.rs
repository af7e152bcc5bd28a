//! In-memory persistence backends.
//!
//! [`MemoryStore`] keeps the encoded local document in a string, so it goes
//! through the same decode path as a real backend. [`MemoryRemote`] is a
//! cheaply clonable handle to a shared document that can be taken offline or
//! paused mid-write.

use std::sync::{
  Arc, Mutex, PoisonError,
  atomic::{AtomicBool, Ordering},
};

use thiserror::Error;
use tokio::sync::watch;

use crate::{
  entry::Entry,
  persist::{LocalStore, RemoteStore, decode_local, encode_local},
};

#[derive(Debug, Error)]
pub enum MemoryError {
  #[error("store is unavailable")]
  Unavailable,

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),
}

// ─── Local ───────────────────────────────────────────────────────────────────

/// Local store holding the serialized document in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
  raw:        Mutex<Option<String>>,
  fail_saves: AtomicBool,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  /// Start from an already-serialized document, valid or not.
  pub fn with_raw(raw: impl Into<String>) -> Self {
    Self { raw: Mutex::new(Some(raw.into())), ..Self::default() }
  }

  /// Make every subsequent save fail (or succeed again).
  pub fn fail_saves(&self, fail: bool) { self.fail_saves.store(fail, Ordering::SeqCst); }

  /// The document as last written.
  pub fn raw(&self) -> Option<String> {
    self.raw.lock().unwrap_or_else(PoisonError::into_inner).clone()
  }
}

impl LocalStore for MemoryStore {
  type Error = MemoryError;

  async fn load(&self) -> Result<Vec<Entry>, MemoryError> {
    let raw = self.raw();
    Ok(raw.as_deref().and_then(decode_local).unwrap_or_default())
  }

  async fn save(&self, entries: &[Entry]) -> Result<(), MemoryError> {
    if self.fail_saves.load(Ordering::SeqCst) {
      return Err(MemoryError::Unavailable);
    }
    let encoded = encode_local(entries)?;
    *self.raw.lock().unwrap_or_else(PoisonError::into_inner) = Some(encoded);
    Ok(())
  }
}

// ─── Remote ──────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct RemoteInner {
  document: Mutex<Option<Vec<Entry>>>,
  /// Collection sizes of every completed save, in completion order.
  saves:    Mutex<Vec<usize>>,
  offline:  AtomicBool,
  paused:   watch::Sender<bool>,
}

/// Remote mirror backed by a shared in-memory document.
#[derive(Debug, Clone)]
pub struct MemoryRemote {
  inner: Arc<RemoteInner>,
}

impl Default for MemoryRemote {
  fn default() -> Self { Self::new() }
}

impl MemoryRemote {
  /// A remote with no document yet.
  pub fn new() -> Self {
    let (paused, _) = watch::channel(false);
    Self {
      inner: Arc::new(RemoteInner {
        document: Mutex::new(None),
        saves: Mutex::new(Vec::new()),
        offline: AtomicBool::new(false),
        paused,
      }),
    }
  }

  /// A remote that already holds `entries`.
  pub fn with_document(entries: Vec<Entry>) -> Self {
    let remote = Self::new();
    *remote.lock_document() = Some(entries);
    remote
  }

  pub fn set_offline(&self, offline: bool) { self.inner.offline.store(offline, Ordering::SeqCst); }

  /// While paused, saves block before writing.
  pub fn set_paused(&self, paused: bool) { self.inner.paused.send_replace(paused); }

  pub fn document(&self) -> Option<Vec<Entry>> { self.lock_document().clone() }

  pub fn completed_saves(&self) -> Vec<usize> {
    self.inner.saves.lock().unwrap_or_else(PoisonError::into_inner).clone()
  }

  fn lock_document(&self) -> std::sync::MutexGuard<'_, Option<Vec<Entry>>> {
    self.inner.document.lock().unwrap_or_else(PoisonError::into_inner)
  }

  fn check_online(&self) -> Result<(), MemoryError> {
    if self.inner.offline.load(Ordering::SeqCst) {
      Err(MemoryError::Unavailable)
    } else {
      Ok(())
    }
  }
}

impl RemoteStore for MemoryRemote {
  type Error = MemoryError;

  async fn load(&self) -> Result<Option<Vec<Entry>>, MemoryError> {
    self.check_online()?;
    Ok(self.document())
  }

  async fn save(&self, entries: &[Entry]) -> Result<(), MemoryError> {
    let mut paused = self.inner.paused.subscribe();
    // The sender lives in `inner`, so this only fails if `self` is gone.
    let _ = paused.wait_for(|p| !*p).await;

    self.check_online()?;
    *self.lock_document() = Some(entries.to_vec());
    self
      .inner
      .saves
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .push(entries.len());
    Ok(())
  }
}
