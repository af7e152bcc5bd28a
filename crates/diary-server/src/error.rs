//! Startup errors for the diary server.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("sqlite store: {0}")]
  Sqlite(#[from] diary_store_sqlite::Error),

  #[error("remote mirror: {0}")]
  Remote(#[from] diary_remote::Error),

  #[error("diary store: {0}")]
  Store(#[from] diary_core::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
