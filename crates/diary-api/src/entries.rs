//! Handlers for `/entries` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/entries` | Optional `?search`, `week`, `type`; newest first |
//! | `POST`   | `/entries` | Body: [`DraftBody`]; returns 201 + stored entry |
//! | `GET`    | `/entries/{id}` | 404 if not found |
//! | `PUT`    | `/entries/{id}` | Body: [`DraftBody`]; returns the updated entry |
//! | `DELETE` | `/entries/{id}` | 204 on success |

use axum::{
  Json,
  extract::{Path, Query, State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::NaiveDate;
use diary_core::{
  entry::{Entry, EntryDraft, EntryId, EntryType},
  persist::{LocalStore, RemoteStore},
  query::{self, EntryFilter},
};
use serde::Deserialize;

use crate::{ApiState, error::ApiError};

// ─── List ────────────────────────────────────────────────────────────────────

/// Raw list filters. Form-style clients send empty values for "any", so
/// everything arrives as a string and is interpreted in [`ListParams::filter`].
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  #[serde(default)]
  pub search: String,
  pub week:   Option<String>,
  #[serde(rename = "type")]
  pub kind:   Option<String>,
}

impl ListParams {
  pub fn filter(self) -> Result<EntryFilter, ApiError> {
    let week = match non_empty(self.week) {
      Some(w) => Some(
        w.parse::<u32>()
          .map_err(|_| ApiError::BadRequest(format!("week must be a number, got {w:?}")))?,
      ),
      None => None,
    };

    Ok(EntryFilter {
      search: self.search,
      week,
      entry_type: non_empty(self.kind).map(EntryType::from),
    })
  }
}

fn non_empty(value: Option<String>) -> Option<String> {
  value.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

/// `GET /entries[?search=...][&week=...][&type=...]`
pub async fn list<L, R>(
  State(state): State<ApiState<L, R>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Entry>>, ApiError>
where
  L: LocalStore + 'static,
  R: RemoteStore + 'static,
{
  let filter = params.filter()?;
  let entries = state.store.all().await;
  Ok(Json(query::sort_by_recency(query::filter(&entries, &filter))))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /entries/{id}`
pub async fn get_one<L, R>(
  State(state): State<ApiState<L, R>>,
  Path(id): Path<EntryId>,
) -> Result<Json<Entry>, ApiError>
where
  L: LocalStore + 'static,
  R: RemoteStore + 'static,
{
  let entry = state
    .store
    .get(id)
    .await
    .ok_or_else(|| ApiError::NotFound(format!("entry {id} not found")))?;
  Ok(Json(entry))
}

// ─── Create / update ─────────────────────────────────────────────────────────

/// Topics as typed into a form (`"a, b"`) or as a JSON list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum TopicsField {
  List(Vec<String>),
  Csv(String),
}

/// JSON body accepted by `POST /entries` and `PUT /entries/{id}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftBody {
  #[serde(rename = "type")]
  pub entry_type:  EntryType,
  pub week:        u32,
  pub day:         Option<u32>,
  pub lesson_date: Option<NaiveDate>,
  pub title:       String,
  pub topics:      Option<TopicsField>,
  pub content:     String,
  pub time_spent:  Option<f64>,
}

impl From<DraftBody> for EntryDraft {
  fn from(b: DraftBody) -> Self {
    EntryDraft {
      entry_type:  b.entry_type,
      week:        b.week,
      day:         b.day,
      lesson_date: b.lesson_date,
      title:       b.title,
      topics:      match b.topics {
        Some(TopicsField::List(list)) => list,
        Some(TopicsField::Csv(csv)) => EntryDraft::parse_topics(&csv),
        None => Vec::new(),
      },
      content:     b.content,
      time_spent:  b.time_spent,
    }
  }
}

/// `POST /entries`: returns 201 + the stored [`Entry`].
pub async fn create<L, R>(
  State(state): State<ApiState<L, R>>,
  body: Result<Json<DraftBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  L: LocalStore + 'static,
  R: RemoteStore + 'static,
{
  let Json(body) = body?;
  let entry = state.store.create(body.into()).await?;
  Ok((StatusCode::CREATED, Json(entry)))
}

/// `PUT /entries/{id}`: replaces everything except `id`, `date` and
/// `timestamp`.
pub async fn update<L, R>(
  State(state): State<ApiState<L, R>>,
  Path(id): Path<EntryId>,
  body: Result<Json<DraftBody>, JsonRejection>,
) -> Result<Json<Entry>, ApiError>
where
  L: LocalStore + 'static,
  R: RemoteStore + 'static,
{
  let Json(body) = body?;
  Ok(Json(state.store.update(id, body.into()).await?))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /entries/{id}`
pub async fn delete<L, R>(
  State(state): State<ApiState<L, R>>,
  Path(id): Path<EntryId>,
) -> Result<StatusCode, ApiError>
where
  L: LocalStore + 'static,
  R: RemoteStore + 'static,
{
  state.store.delete(id).await?;
  Ok(StatusCode::NO_CONTENT)
}
