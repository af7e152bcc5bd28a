//! [`EntryStore`], the single owner of the entry collection.
//!
//! Every mutation runs under one async lock: validate, change the in-memory
//! collection, write it to the local store, then hand a snapshot to the
//! remote mirror. Readers get cloned snapshots and run [`crate::query`]
//! functions over them.

use std::{collections::HashSet, sync::Arc, time::Duration};

use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::{Mutex, broadcast};

use crate::{
  Error, Result,
  entry::{Entry, EntryDraft, EntryId, normalize_topics},
  notice::Notice,
  persist::{LocalStore, NoRemote, RemoteStore},
  sync::RemoteSync,
};

const NOTICE_CAPACITY: usize = 64;

// ─── Options ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct StoreOptions {
  /// Upper bound on the initial remote load before falling back to local.
  pub remote_wait: Duration,
}

impl Default for StoreOptions {
  fn default() -> Self { Self { remote_wait: Duration::from_secs(3) } }
}

// ─── Export ──────────────────────────────────────────────────────────────────

/// A serialized copy of the whole collection, ready to be written to a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
  pub file_name: String,
  /// Pretty-printed JSON array of entries.
  pub body:      String,
}

/// Deterministic export file name for `date`.
pub fn export_file_name(date: NaiveDate) -> String {
  format!("IT401_Learning_Diary_{}.json", date.format("%Y-%m-%d"))
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// The diary's entry collection with local-first persistence and an optional
/// remote mirror.
pub struct EntryStore<L, R = NoRemote> {
  local:   L,
  remote:  Option<Arc<R>>,
  sync:    Option<RemoteSync>,
  entries: Mutex<Vec<Entry>>,
  notices: broadcast::Sender<Notice>,
  startup: Vec<Notice>,
}

impl<L: LocalStore> EntryStore<L, NoRemote> {
  /// Open a store without a remote mirror.
  pub async fn local_only(local: L) -> Result<Self> {
    Self::open(local, None, StoreOptions::default()).await
  }
}

impl<L, R> EntryStore<L, R>
where
  L: LocalStore,
  R: RemoteStore + 'static,
{
  /// Load the initial collection and start the remote mirror.
  ///
  /// A reachable remote document wins and overwrites the local copy. A
  /// missing document, an unreachable remote or one that does not answer
  /// within `options.remote_wait` falls back to the local store.
  pub async fn open(local: L, remote: Option<R>, options: StoreOptions) -> Result<Self> {
    let (notices, _) = broadcast::channel(NOTICE_CAPACITY);
    let remote = remote.map(Arc::new);
    let mut startup = Vec::new();

    let adopted = match &remote {
      Some(remote) => load_remote(remote.as_ref(), options.remote_wait, &mut startup).await,
      None => None,
    };

    let entries = match adopted {
      Some(entries) => {
        local.save(&entries).await.map_err(local_error)?;
        startup.push(Notice::LoadedFromRemote { count: entries.len() });
        entries
      }
      None => {
        let entries = repair(local.load().await.map_err(local_error)?, "local");
        startup.push(if entries.is_empty() {
          Notice::StartedEmpty
        } else {
          Notice::LoadedFromLocal { count: entries.len() }
        });
        entries
      }
    };

    tracing::info!(
      entries = entries.len(),
      mirrored = remote.is_some(),
      "diary store opened"
    );

    let sync = remote
      .as_ref()
      .map(|remote| RemoteSync::spawn(Arc::clone(remote), notices.clone()));

    Ok(Self { local, remote, sync, entries: Mutex::new(entries), notices, startup })
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  /// Snapshot of the collection in storage order.
  pub async fn all(&self) -> Vec<Entry> { self.entries.lock().await.clone() }

  pub async fn get(&self, id: EntryId) -> Option<Entry> {
    self.entries.lock().await.iter().find(|e| e.id == id).cloned()
  }

  /// The local backend, for callers that need to inspect it directly.
  pub fn local(&self) -> &L { &self.local }

  /// The remote mirror, if one is configured.
  pub fn remote(&self) -> Option<&R> { self.remote.as_deref() }

  /// Notices produced while opening the store, before anyone could subscribe.
  pub fn startup_notices(&self) -> &[Notice] { &self.startup }

  /// Receive notices for every later mutation and remote outcome.
  pub fn subscribe(&self) -> broadcast::Receiver<Notice> { self.notices.subscribe() }

  /// Serialize the whole collection for download.
  pub async fn export(&self) -> Result<Export> {
    let entries = self.entries.lock().await;
    Ok(Export {
      file_name: export_file_name(Utc::now().date_naive()),
      body:      serde_json::to_string_pretty(&*entries)?,
    })
  }

  // ── Mutations ─────────────────────────────────────────────────────────────

  pub async fn create(&self, draft: EntryDraft) -> Result<Entry> {
    let draft = draft.normalized()?;
    let mut entries = self.entries.lock().await;

    let now = Utc::now();
    let entry = draft.into_entry(next_id(&entries, now)?, now);
    entries.push(entry.clone());

    self.persist(&entries).await?;
    tracing::info!(id = %entry.id, week = entry.week, "entry created");
    self.notify(Notice::EntryCreated { id: entry.id });
    Ok(entry)
  }

  /// Replace every field of entry `id` except `id`, `date` and `timestamp`.
  pub async fn update(&self, id: EntryId, draft: EntryDraft) -> Result<Entry> {
    let draft = draft.normalized()?;
    let mut entries = self.entries.lock().await;

    let entry = entries
      .iter_mut()
      .find(|e| e.id == id)
      .ok_or(Error::EntryNotFound(id))?;
    draft.apply_to(entry);
    let updated = entry.clone();

    self.persist(&entries).await?;
    tracing::info!(%id, "entry updated");
    self.notify(Notice::EntryUpdated { id });
    Ok(updated)
  }

  pub async fn delete(&self, id: EntryId) -> Result<()> {
    let mut entries = self.entries.lock().await;

    let position = entries
      .iter()
      .position(|e| e.id == id)
      .ok_or(Error::EntryNotFound(id))?;
    entries.remove(position);

    self.persist(&entries).await?;
    tracing::info!(%id, "entry deleted");
    self.notify(Notice::EntryDeleted { id });
    Ok(())
  }

  /// Discard the current collection and adopt `incoming` wholesale.
  ///
  /// Ids must be unique and week, day and time spent must be in range; topics
  /// are cleaned of blanks. Text length limits are not applied, so older
  /// exports always load.
  pub async fn replace_all(&self, incoming: Vec<Entry>) -> Result<()> {
    let mut seen = HashSet::with_capacity(incoming.len());
    for (i, entry) in incoming.iter().enumerate() {
      if !seen.insert(entry.id) {
        return Err(Error::validation(format!("entry {i} has duplicate id {}", entry.id)));
      }
      entry.check_numbers().map_err(|e| match e {
        Error::Validation(reason) => Error::validation(format!("entry {i} is invalid: {reason}")),
        other => other,
      })?;
    }
    let incoming: Vec<Entry> = incoming
      .into_iter()
      .map(|mut e| {
        e.topics = normalize_topics(e.topics);
        e
      })
      .collect();

    let mut entries = self.entries.lock().await;
    *entries = incoming;
    let count = entries.len();

    self.persist(&entries).await?;
    tracing::info!(count, "collection replaced");
    self.notify(Notice::Imported { count });
    Ok(())
  }

  /// Parse an import document and replace the collection with it.
  ///
  /// The document must be a JSON array of entry records; anything else fails
  /// with [`Error::Validation`] and leaves the collection untouched.
  pub async fn import_json(&self, raw: &str) -> Result<usize> {
    let value: serde_json::Value = serde_json::from_str(raw)
      .map_err(|e| Error::validation(format!("import is not valid JSON: {e}")))?;
    let serde_json::Value::Array(items) = value else {
      return Err(Error::validation("import must be a JSON array of entries"));
    };

    let incoming = items
      .into_iter()
      .enumerate()
      .map(|(i, item)| {
        serde_json::from_value::<Entry>(item)
          .map_err(|e| Error::validation(format!("entry {i} is malformed: {e}")))
      })
      .collect::<Result<Vec<_>>>()?;

    let count = incoming.len();
    self.replace_all(incoming).await?;
    Ok(count)
  }

  /// Wait until the newest snapshot has been offered to the remote mirror.
  /// Returns immediately when no mirror is configured.
  pub async fn flush(&self) {
    if let Some(sync) = &self.sync {
      sync.flush().await;
    }
  }

  // ── Internals ─────────────────────────────────────────────────────────────

  /// Local first, then hand off to the mirror. A local failure is returned;
  /// remote outcomes only ever surface as notices.
  async fn persist(&self, entries: &[Entry]) -> Result<()> {
    if let Err(e) = self.local.save(entries).await {
      tracing::error!(error = %e, "local save failed");
      self.notify(Notice::LocalSaveFailed { reason: e.to_string() });
      return Err(local_error(e));
    }

    match &self.sync {
      Some(sync) => sync.submit(entries.to_vec()),
      None => self.notify(Notice::SavedLocally),
    }
    Ok(())
  }

  fn notify(&self, notice: Notice) {
    // No subscribers is fine.
    let _ = self.notices.send(notice);
  }
}

async fn load_remote<R: RemoteStore>(
  remote: &R,
  wait: Duration,
  startup: &mut Vec<Notice>,
) -> Option<Vec<Entry>> {
  match tokio::time::timeout(wait, remote.load()).await {
    Ok(Ok(Some(entries))) => Some(repair(entries, "remote")),
    Ok(Ok(None)) => {
      tracing::info!("no remote document yet; using local store");
      None
    }
    Ok(Err(e)) => {
      tracing::warn!(error = %e, "remote load failed; using local store");
      startup.push(Notice::RemoteLoadFailed { reason: e.to_string() });
      None
    }
    Err(_) => {
      tracing::warn!(?wait, "remote load timed out; using local store");
      startup.push(Notice::RemoteLoadFailed {
        reason: format!("no response within {wait:?}"),
      });
      None
    }
  }
}

/// Restore collection invariants on stored data: blank topics are dropped and
/// only the first entry with a given id is kept.
fn repair(entries: Vec<Entry>, source: &str) -> Vec<Entry> {
  let before = entries.len();
  let mut seen = HashSet::with_capacity(before);
  let repaired: Vec<Entry> = entries
    .into_iter()
    .filter(|e| seen.insert(e.id))
    .map(|mut e| {
      e.topics = normalize_topics(e.topics);
      e
    })
    .collect();

  if repaired.len() != before {
    tracing::warn!(source, dropped = before - repaired.len(), "dropped entries with duplicate ids");
  }
  repaired
}

/// Time-derived id, forced above every id already in use.
fn next_id(entries: &[Entry], now: DateTime<Utc>) -> Result<EntryId> {
  let now_ms = now.timestamp_millis();
  match entries.iter().map(|e| e.id.0).max() {
    None => Ok(EntryId(now_ms)),
    Some(max) => max
      .checked_add(1)
      .map(|floor| EntryId(now_ms.max(floor)))
      .ok_or_else(|| Error::validation(format!("no entry id is left above {max}"))),
  }
}

fn local_error<E>(e: E) -> Error
where
  E: std::error::Error + Send + Sync + 'static,
{
  Error::LocalPersistence(Box::new(e))
}
