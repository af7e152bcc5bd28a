//! Background mirroring of the collection to a [`RemoteStore`].
//!
//! There is exactly one pending slot. Each submission replaces whatever
//! snapshot the worker has not picked up yet, and the worker only ever saves
//! the newest one, so an older collection can never land after a newer one.

use std::sync::Arc;

use tokio::sync::{broadcast, watch};

use crate::{entry::Entry, notice::Notice, persist::RemoteStore};

#[derive(Debug, Clone, Default)]
struct Snapshot {
  generation: u64,
  entries:    Arc<Vec<Entry>>,
}

/// Handle to the mirroring task. Dropping it lets the task finish its
/// current write and exit.
#[derive(Debug)]
pub(crate) struct RemoteSync {
  pending:   watch::Sender<Snapshot>,
  attempted: watch::Receiver<u64>,
}

impl RemoteSync {
  pub(crate) fn spawn<R>(remote: Arc<R>, notices: broadcast::Sender<Notice>) -> Self
  where
    R: RemoteStore + 'static,
  {
    let (pending, rx) = watch::channel(Snapshot::default());
    let (attempted_tx, attempted) = watch::channel(0);
    tokio::spawn(run(remote, rx, attempted_tx, notices));
    Self { pending, attempted }
  }

  /// Replace the pending snapshot with `entries`.
  pub(crate) fn submit(&self, entries: Vec<Entry>) {
    self.pending.send_modify(|snapshot| {
      snapshot.generation += 1;
      snapshot.entries = Arc::new(entries);
    });
  }

  /// Wait until the newest submitted snapshot has been attempted, whether the
  /// write succeeded or not.
  pub(crate) async fn flush(&self) {
    let target = self.pending.borrow().generation;
    let mut attempted = self.attempted.clone();
    // Fails only if the worker is gone, in which case there is nothing to wait for.
    let _ = attempted.wait_for(|done| *done >= target).await;
  }
}

async fn run<R: RemoteStore>(
  remote: Arc<R>,
  mut pending: watch::Receiver<Snapshot>,
  attempted: watch::Sender<u64>,
  notices: broadcast::Sender<Notice>,
) {
  while pending.changed().await.is_ok() {
    let snapshot = pending.borrow_and_update().clone();

    let notice = match remote.save(&snapshot.entries).await {
      Ok(()) => {
        tracing::debug!(
          generation = snapshot.generation,
          entries = snapshot.entries.len(),
          "mirrored diary to remote"
        );
        Notice::RemoteSaved
      }
      Err(e) => {
        tracing::warn!(
          generation = snapshot.generation,
          error = %e,
          "remote save failed; local copy kept"
        );
        Notice::RemoteSaveFailed { reason: e.to_string() }
      }
    };

    // No subscribers is fine.
    let _ = notices.send(notice);
    attempted.send_replace(snapshot.generation);
  }
  tracing::debug!("remote sync worker stopped");
}
