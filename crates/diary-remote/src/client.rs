//! Async HTTP client for the remote diary document.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use diary_core::{
  entry::Entry,
  persist::{RemoteDocument, RemoteStore},
};

use crate::{Error, Result};

fn default_user_id() -> String { "defaultUser".to_owned() }

fn default_timeout_secs() -> u64 { 10 }

/// Connection settings for the document service.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
  pub base_url:     String,
  /// Identifies the one document this diary reads and writes.
  #[serde(default = "default_user_id")]
  pub user_id:      String,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

impl RemoteConfig {
  pub fn new(base_url: impl Into<String>) -> Self {
    Self {
      base_url:     base_url.into(),
      user_id:      default_user_id(),
      timeout_secs: default_timeout_secs(),
    }
  }
}

/// Borrowing twin of [`RemoteDocument`] so saves don't clone the collection.
#[derive(Serialize)]
struct DocumentRef<'a> {
  entries: &'a [Entry],
}

/// Remote mirror that keeps the whole collection in one JSON document.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Debug, Clone)]
pub struct HttpRemote {
  client: Client,
  url:    String,
}

impl HttpRemote {
  pub fn new(config: &RemoteConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()?;
    let url = format!(
      "{}/diaries/{}",
      config.base_url.trim_end_matches('/'),
      config.user_id
    );
    Ok(Self { client, url })
  }

  /// The document's address.
  pub fn url(&self) -> &str { &self.url }

  fn status_error(&self, method: &'static str, status: StatusCode) -> Error {
    Error::Status { method, url: self.url.clone(), status }
  }
}

impl RemoteStore for HttpRemote {
  type Error = Error;

  /// `GET {base_url}/diaries/{user_id}`; 404 means no document yet.
  async fn load(&self) -> Result<Option<Vec<Entry>>> {
    let resp = self.client.get(&self.url).send().await?;

    match resp.status() {
      StatusCode::NOT_FOUND => {
        tracing::debug!(url = %self.url, "remote document not found");
        Ok(None)
      }
      status if status.is_success() => {
        let document: RemoteDocument = resp.json().await?;
        tracing::debug!(url = %self.url, entries = document.entries.len(), "fetched remote document");
        Ok(Some(document.entries))
      }
      status => Err(self.status_error("GET", status)),
    }
  }

  /// `PUT {base_url}/diaries/{user_id}` with `{"entries": [...]}`.
  async fn save(&self, entries: &[Entry]) -> Result<()> {
    let resp = self
      .client
      .put(&self.url)
      .json(&DocumentRef { entries })
      .send()
      .await?;

    if !resp.status().is_success() {
      return Err(self.status_error("PUT", resp.status()));
    }
    Ok(())
  }
}
