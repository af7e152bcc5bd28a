//! Error types for `diary-core`.

use thiserror::Error;

use crate::entry::EntryId;

#[derive(Debug, Error)]
pub enum Error {
  /// Input to create, update or import broke a required-field or shape
  /// constraint. Nothing was mutated.
  #[error("validation failed: {0}")]
  Validation(String),

  #[error("entry not found: {0}")]
  EntryNotFound(EntryId),

  /// The local store could not make the collection durable. The in-memory
  /// collection already reflects the mutation.
  #[error("local persistence failed: {0}")]
  LocalPersistence(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  pub(crate) fn validation(message: impl Into<String>) -> Self {
    Self::Validation(message.into())
  }

  pub fn is_validation(&self) -> bool { matches!(self, Self::Validation(_)) }

  pub fn is_not_found(&self) -> bool { matches!(self, Self::EntryNotFound(_)) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
