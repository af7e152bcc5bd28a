//! Read-only derived views: statistics, the week list and the overview.

use std::collections::BTreeMap;

use axum::{Json, extract::State};
use chrono::Utc;
use diary_core::{
  persist::{LocalStore, RemoteStore},
  query::{self, Stats, WeekSummary},
};

use crate::ApiState;

/// `GET /stats`
pub async fn stats<L, R>(State(state): State<ApiState<L, R>>) -> Json<Stats>
where
  L: LocalStore + 'static,
  R: RemoteStore + 'static,
{
  let entries = state.store.all().await;
  Json(query::stats(&entries, &state.semester, Utc::now()))
}

/// `GET /weeks`: distinct weeks that have entries, ascending.
pub async fn weeks<L, R>(State(state): State<ApiState<L, R>>) -> Json<Vec<u32>>
where
  L: LocalStore + 'static,
  R: RemoteStore + 'static,
{
  Json(query::weeks_present(&state.store.all().await))
}

/// `GET /overview`: entries grouped by week, then by day.
pub async fn overview<L, R>(
  State(state): State<ApiState<L, R>>,
) -> Json<BTreeMap<u32, WeekSummary>>
where
  L: LocalStore + 'static,
  R: RemoteStore + 'static,
{
  Json(query::group_for_overview(&state.store.all().await))
}
