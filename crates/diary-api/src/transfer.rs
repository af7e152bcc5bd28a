//! Whole-collection export and import.

use axum::{
  Json,
  extract::{Query, State},
  http::header,
  response::IntoResponse,
};
use diary_core::persist::{LocalStore, RemoteStore};
use serde::{Deserialize, Serialize};

use crate::{ApiState, error::ApiError};

/// `GET /export`: the collection as a downloadable JSON file.
pub async fn export<L, R>(State(state): State<ApiState<L, R>>) -> Result<impl IntoResponse, ApiError>
where
  L: LocalStore + 'static,
  R: RemoteStore + 'static,
{
  let export = state.store.export().await?;
  let disposition = format!("attachment; filename=\"{}\"", export.file_name);
  Ok((
    [
      (header::CONTENT_TYPE, "application/json".to_owned()),
      (header::CONTENT_DISPOSITION, disposition),
    ],
    export.body,
  ))
}

#[derive(Debug, Default, Deserialize)]
pub struct ImportParams {
  /// Import discards every existing entry, so callers must opt in.
  #[serde(default)]
  pub confirm: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ImportSummary {
  pub imported: usize,
}

/// `POST /import?confirm=true`. The body is a previously exported JSON array.
pub async fn import<L, R>(
  State(state): State<ApiState<L, R>>,
  Query(params): Query<ImportParams>,
  body: String,
) -> Result<Json<ImportSummary>, ApiError>
where
  L: LocalStore + 'static,
  R: RemoteStore + 'static,
{
  if !params.confirm {
    return Err(ApiError::BadRequest(
      "import replaces all entries; repeat with confirm=true".into(),
    ));
  }
  let imported = state.store.import_json(&body).await?;
  Ok(Json(ImportSummary { imported }))
}
