//! JSON REST API for the learning diary.
//!
//! Exposes an axum [`Router`] over an [`EntryStore`]. TLS and transport
//! concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", diary_api::api_router(ApiState::new(store, semester)))
//! ```

pub mod entries;
pub mod error;
pub mod transfer;
pub mod views;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use diary_core::{
  calendar::Semester,
  persist::{LocalStore, RemoteStore},
  store::EntryStore,
};

pub use error::ApiError;

// ─── State ───────────────────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct ApiState<L, R> {
  pub store:    Arc<EntryStore<L, R>>,
  /// Calendar used for the current-week statistic.
  pub semester: Semester,
}

impl<L, R> ApiState<L, R> {
  pub fn new(store: Arc<EntryStore<L, R>>, semester: Semester) -> Self { Self { store, semester } }
}

// Manual impl: deriving would demand `L: Clone` and `R: Clone`.
impl<L, R> Clone for ApiState<L, R> {
  fn clone(&self) -> Self { Self { store: Arc::clone(&self.store), semester: self.semester } }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router over `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<L, R>(state: ApiState<L, R>) -> Router<()>
where
  L: LocalStore + 'static,
  R: RemoteStore + 'static,
{
  Router::new()
    // Entries
    .route("/entries", get(entries::list::<L, R>).post(entries::create::<L, R>))
    .route(
      "/entries/{id}",
      get(entries::get_one::<L, R>)
        .put(entries::update::<L, R>)
        .delete(entries::delete::<L, R>),
    )
    // Derived views
    .route("/stats", get(views::stats::<L, R>))
    .route("/weeks", get(views::weeks::<L, R>))
    .route("/overview", get(views::overview::<L, R>))
    // Transfer
    .route("/export", get(transfer::export::<L, R>))
    .route("/import", post(transfer::import::<L, R>))
    .with_state(state)
}
