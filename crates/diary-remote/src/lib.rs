//! HTTP document-store mirror for the learning diary.
//!
//! Implements [`diary_core::persist::RemoteStore`] against a service that
//! keeps one JSON document per user record at `{base_url}/diaries/{user_id}`.

mod client;

pub mod error;

pub use client::{HttpRemote, RemoteConfig};
pub use error::{Error, Result};
