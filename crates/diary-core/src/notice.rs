//! Ephemeral, user-facing notifications emitted by the store.

use std::fmt;

use serde::Serialize;

use crate::entry::EntryId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
  Success,
  Info,
  Error,
}

/// Outcome of a mutation or of a persistence step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
  EntryCreated { id: EntryId },
  EntryUpdated { id: EntryId },
  EntryDeleted { id: EntryId },
  Imported { count: usize },
  LoadedFromRemote { count: usize },
  LoadedFromLocal { count: usize },
  StartedEmpty,
  RemoteLoadFailed { reason: String },
  RemoteSaved,
  /// No remote is configured; the local write is the only copy.
  SavedLocally,
  RemoteSaveFailed { reason: String },
  LocalSaveFailed { reason: String },
}

impl Notice {
  pub fn level(&self) -> NoticeLevel {
    match self {
      Self::EntryCreated { .. }
      | Self::EntryUpdated { .. }
      | Self::Imported { .. }
      | Self::RemoteSaved => NoticeLevel::Success,
      Self::EntryDeleted { .. }
      | Self::LoadedFromRemote { .. }
      | Self::LoadedFromLocal { .. }
      | Self::StartedEmpty
      | Self::SavedLocally => NoticeLevel::Info,
      Self::RemoteLoadFailed { .. }
      | Self::RemoteSaveFailed { .. }
      | Self::LocalSaveFailed { .. } => NoticeLevel::Error,
    }
  }
}

impl fmt::Display for Notice {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::EntryCreated { .. } => f.write_str("Entry saved successfully!"),
      Self::EntryUpdated { .. } => f.write_str("Entry updated successfully!"),
      Self::EntryDeleted { .. } => f.write_str("Entry deleted successfully!"),
      Self::Imported { count } => write!(f, "Diary imported successfully ({count} entries)!"),
      Self::LoadedFromRemote { count } => write!(f, "Loaded {count} entries from cloud"),
      Self::LoadedFromLocal { count } => {
        write!(f, "Loaded {count} entries from local storage")
      }
      Self::StartedEmpty => f.write_str("No saved entries found"),
      Self::RemoteLoadFailed { reason } => write!(f, "Error loading from cloud: {reason}"),
      Self::RemoteSaved => f.write_str("Saved to cloud!"),
      Self::SavedLocally => f.write_str("Saved locally!"),
      Self::RemoteSaveFailed { reason } => {
        write!(f, "Error saving to cloud, kept local copy: {reason}")
      }
      Self::LocalSaveFailed { reason } => write!(f, "Error saving locally: {reason}"),
    }
  }
}
