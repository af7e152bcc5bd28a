//! Entry types, the sole domain record of the learning diary.
//!
//! An entry describes one unit of study: what kind of session it was, where it
//! sits in the semester (week and optional day), what was covered and how long
//! it took. `id`, `date` and `timestamp` are assigned once by the store and
//! never change afterwards.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Minimum title length, in characters, after trimming.
pub const TITLE_MIN_CHARS: usize = 3;
/// Maximum title length, in characters, after trimming.
pub const TITLE_MAX_CHARS: usize = 100;
/// Minimum content length, in characters, after trimming.
pub const CONTENT_MIN_CHARS: usize = 10;
/// Maximum content length, in characters, after trimming.
pub const CONTENT_MAX_CHARS: usize = 2000;
/// Maximum length of the topic list written out as `"a, b, c"`.
pub const TOPICS_MAX_CHARS: usize = 250;

/// Label used for entries that carry no `day`.
pub const GENERAL_DAY_LABEL: &str = "General";

// ─── Identity ────────────────────────────────────────────────────────────────

/// Unique, immutable identifier of an entry.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EntryId(pub i64);

impl fmt::Display for EntryId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

// ─── Type vocabulary ─────────────────────────────────────────────────────────

/// The kind of study session an entry records.
///
/// Unrecognised strings are kept verbatim in [`EntryType::Other`] so that a
/// document round-trips without loss; they share the default display icon.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntryType {
  Orientation,
  Day,
  Lab,
  Assignment,
  Exam,
  Project,
  Research,
  Other(String),
}

impl EntryType {
  pub fn as_str(&self) -> &str {
    match self {
      Self::Orientation => "orientation",
      Self::Day => "day",
      Self::Lab => "lab",
      Self::Assignment => "assignment",
      Self::Exam => "exam",
      Self::Project => "project",
      Self::Research => "research",
      Self::Other(s) => s,
    }
  }

  pub fn is_known(&self) -> bool { !matches!(self, Self::Other(_)) }

  /// Display icon; unknown types fall back to the generic book.
  pub fn icon(&self) -> &'static str {
    match self {
      Self::Orientation => "🎯",
      Self::Day => "📖",
      Self::Lab => "🔬",
      Self::Assignment => "📄",
      Self::Exam => "📝",
      Self::Project => "🚀",
      Self::Research => "🔍",
      Self::Other(_) => "📚",
    }
  }
}

impl From<String> for EntryType {
  fn from(s: String) -> Self {
    match s.as_str() {
      "orientation" => Self::Orientation,
      "day" => Self::Day,
      "lab" => Self::Lab,
      "assignment" => Self::Assignment,
      "exam" => Self::Exam,
      "project" => Self::Project,
      "research" => Self::Research,
      _ => Self::Other(s),
    }
  }
}

impl From<&str> for EntryType {
  fn from(s: &str) -> Self { Self::from(s.to_owned()) }
}

impl From<EntryType> for String {
  fn from(t: EntryType) -> Self {
    match t {
      EntryType::Other(s) => s,
      known => known.as_str().to_owned(),
    }
  }
}

impl fmt::Display for EntryType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

// ─── Entry ───────────────────────────────────────────────────────────────────

/// A stored diary entry.
///
/// Field names match the persisted document, so the same shape is used for
/// local storage, the remote mirror and exports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
  pub id:          EntryId,
  #[serde(rename = "type")]
  pub entry_type:  EntryType,
  pub week:        u32,
  #[serde(default)]
  pub day:         Option<u32>,
  #[serde(default)]
  pub lesson_date: Option<NaiveDate>,
  pub title:       String,
  #[serde(default)]
  pub topics:      Vec<String>,
  pub content:     String,
  #[serde(default)]
  pub time_spent:  Option<f64>,
  /// Creation instant; never changes after creation.
  pub date:        DateTime<Utc>,
  /// Creation instant in epoch milliseconds; the recency sort key.
  pub timestamp:   i64,
}

impl Entry {
  /// The day within the week. A stored day of 0 counts as no day.
  pub fn day_number(&self) -> Option<u32> { self.day.filter(|d| *d > 0) }

  /// `"Day N"` when the entry has a day, otherwise [`GENERAL_DAY_LABEL`].
  pub fn day_label(&self) -> String {
    match self.day_number() {
      Some(day) => format!("Day {day}"),
      None => GENERAL_DAY_LABEL.to_owned(),
    }
  }

  /// Hours spent, with an absent value counting as zero.
  pub fn hours(&self) -> f64 { self.time_spent.unwrap_or(0.0) }

  /// Check the numeric fields every stored entry must satisfy, whatever its
  /// origin. Text lengths are not checked here.
  pub(crate) fn check_numbers(&self) -> Result<()> {
    check_ranges(self.week, self.day, self.time_spent)
  }
}

fn check_ranges(week: u32, day: Option<u32>, time_spent: Option<f64>) -> Result<()> {
  if week < 1 {
    return Err(Error::validation("week must be at least 1"));
  }
  if day == Some(0) {
    return Err(Error::validation("day must be at least 1"));
  }
  if let Some(hours) = time_spent
    && !(hours.is_finite() && hours >= 0.0)
  {
    return Err(Error::validation("time spent must be a non-negative number"));
  }
  Ok(())
}

// ─── EntryDraft ──────────────────────────────────────────────────────────────

/// Input to [`crate::store::EntryStore::create`] and
/// [`crate::store::EntryStore::update`].
/// `id`, `date` and `timestamp` are always set by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryDraft {
  pub entry_type:  EntryType,
  pub week:        u32,
  pub day:         Option<u32>,
  pub lesson_date: Option<NaiveDate>,
  pub title:       String,
  pub topics:      Vec<String>,
  pub content:     String,
  pub time_spent:  Option<f64>,
}

impl EntryDraft {
  /// Convenience constructor with all optional fields empty.
  pub fn new(
    entry_type: impl Into<EntryType>,
    week: u32,
    title: impl Into<String>,
    content: impl Into<String>,
  ) -> Self {
    Self {
      entry_type: entry_type.into(),
      week,
      day: None,
      lesson_date: None,
      title: title.into(),
      topics: Vec::new(),
      content: content.into(),
      time_spent: None,
    }
  }

  pub fn with_day(mut self, day: u32) -> Self {
    self.day = Some(day);
    self
  }

  pub fn with_topics(mut self, csv: &str) -> Self {
    self.topics = Self::parse_topics(csv);
    self
  }

  pub fn with_time_spent(mut self, hours: f64) -> Self {
    self.time_spent = Some(hours);
    self
  }

  /// Split a comma-separated topic list, trimming each item and discarding
  /// empty ones. Duplicates are kept.
  pub fn parse_topics(csv: &str) -> Vec<String> {
    csv
      .split(',')
      .map(str::trim)
      .filter(|t| !t.is_empty())
      .map(str::to_owned)
      .collect()
  }

  /// Trim text fields, clean the topic list and check every store-enforced
  /// constraint.
  pub fn normalized(mut self) -> Result<Self> {
    self.title = self.title.trim().to_owned();
    self.content = self.content.trim().to_owned();
    self.topics = normalize_topics(self.topics);

    check_ranges(self.week, self.day, self.time_spent)?;

    let title_len = self.title.chars().count();
    if title_len < TITLE_MIN_CHARS {
      return Err(Error::validation(format!(
        "title must be at least {TITLE_MIN_CHARS} characters"
      )));
    }
    if title_len > TITLE_MAX_CHARS {
      return Err(Error::validation(format!(
        "title must be at most {TITLE_MAX_CHARS} characters"
      )));
    }

    let content_len = self.content.chars().count();
    if content_len < CONTENT_MIN_CHARS {
      return Err(Error::validation(format!(
        "content must be at least {CONTENT_MIN_CHARS} characters"
      )));
    }
    if content_len > CONTENT_MAX_CHARS {
      return Err(Error::validation(format!(
        "content must be at most {CONTENT_MAX_CHARS} characters"
      )));
    }

    if self.topics.join(", ").chars().count() > TOPICS_MAX_CHARS {
      return Err(Error::validation(format!(
        "topics must be at most {TOPICS_MAX_CHARS} characters"
      )));
    }

    Ok(self)
  }

  pub(crate) fn into_entry(self, id: EntryId, recorded_at: DateTime<Utc>) -> Entry {
    Entry {
      id,
      entry_type: self.entry_type,
      week: self.week,
      day: self.day,
      lesson_date: self.lesson_date,
      title: self.title,
      topics: self.topics,
      content: self.content,
      time_spent: self.time_spent,
      date: recorded_at,
      timestamp: recorded_at.timestamp_millis(),
    }
  }

  /// Overwrite every caller-owned field of `entry`, leaving `id`, `date` and
  /// `timestamp` alone.
  pub(crate) fn apply_to(self, entry: &mut Entry) {
    entry.entry_type = self.entry_type;
    entry.week = self.week;
    entry.day = self.day;
    entry.lesson_date = self.lesson_date;
    entry.title = self.title;
    entry.topics = self.topics;
    entry.content = self.content;
    entry.time_spent = self.time_spent;
  }
}

pub(crate) fn normalize_topics(topics: Vec<String>) -> Vec<String> {
  topics
    .into_iter()
    .map(|t| t.trim().to_owned())
    .filter(|t| !t.is_empty())
    .collect()
}
