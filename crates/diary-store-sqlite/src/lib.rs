//! SQLite backend for the diary's local store.
//!
//! The database is used as a small key-value table: the whole collection is
//! one JSON document under a single key. Wraps [`tokio_rusqlite`] so all
//! database access runs on a dedicated thread without blocking the async
//! runtime.

mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::{ENTRIES_KEY, SqliteStore};
