//! Core types and logic for the learning diary.
//!
//! This crate owns the entry model, the [`store::EntryStore`] that mutates it,
//! the pure query functions that derive views from it, and the persistence
//! traits that storage backends implement. It carries no HTTP or database
//! dependencies.

// Backends implement the persistence traits with plain `async fn`; the traits
// themselves spell out the `Send` bounds.
#![allow(async_fn_in_trait)]

pub mod calendar;
pub mod entry;
pub mod error;
pub mod memory;
pub mod notice;
pub mod persist;
pub mod query;
pub mod store;

mod sync;

pub use error::{Error, Result};

#[cfg(test)]
mod tests;
