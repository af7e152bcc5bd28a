//! Read-side derivations over a snapshot of the entry collection.
//!
//! Every function here is pure: it takes entries by reference and returns a
//! fresh view. Nothing is cached between calls, so callers simply re-run the
//! query after each mutation.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  calendar::Semester,
  entry::{Entry, EntryType},
};

// ─── Filtering ───────────────────────────────────────────────────────────────

/// Constraints for [`filter`]. Empty or `None` fields do not constrain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryFilter {
  /// Case-insensitive substring matched against title, content and topics.
  pub search:     String,
  pub week:       Option<u32>,
  pub entry_type: Option<EntryType>,
}

impl EntryFilter {
  pub fn matches(&self, entry: &Entry) -> bool {
    self.matches_search(entry)
      && self.week.is_none_or(|w| entry.week == w)
      && self.entry_type.as_ref().is_none_or(|t| &entry.entry_type == t)
  }

  fn matches_search(&self, entry: &Entry) -> bool {
    if self.search.is_empty() {
      return true;
    }
    let needle = self.search.to_lowercase();
    entry.title.to_lowercase().contains(&needle)
      || entry.content.to_lowercase().contains(&needle)
      || entry.topics.iter().any(|t| t.to_lowercase().contains(&needle))
  }
}

/// Entries matching `filter`, in input order.
pub fn filter(entries: &[Entry], filter: &EntryFilter) -> Vec<Entry> {
  entries.iter().filter(|e| filter.matches(e)).cloned().collect()
}

/// Newest first by `timestamp`. Ties keep their input order.
pub fn sort_by_recency(mut entries: Vec<Entry>) -> Vec<Entry> {
  entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
  entries
}

// ─── Statistics ──────────────────────────────────────────────────────────────

/// Headline numbers for the diary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
  pub total:        usize,
  /// Derived from the clock, not from stored entries.
  pub current_week: u32,
  /// Distinct topics across all entries, compared case-insensitively.
  pub unique_topics: usize,
  /// Distinct UTC calendar dates on which entries were created.
  pub active_days:  usize,
}

pub fn stats(entries: &[Entry], semester: &Semester, now: DateTime<Utc>) -> Stats {
  let topics: HashSet<String> = entries
    .iter()
    .flat_map(|e| e.topics.iter())
    .map(|t| t.to_lowercase())
    .collect();
  let days: HashSet<_> = entries.iter().map(|e| e.date.date_naive()).collect();

  Stats {
    total: entries.len(),
    current_week: semester.current_week(now),
    unique_topics: topics.len(),
    active_days: days.len(),
  }
}

/// Distinct week numbers in ascending order.
pub fn weeks_present(entries: &[Entry]) -> Vec<u32> {
  entries
    .iter()
    .map(|e| e.week)
    .collect::<BTreeSet<_>>()
    .into_iter()
    .collect()
}

// ─── Overview grouping ───────────────────────────────────────────────────────

/// Entries of one day within a week, with their rollups.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayGroup {
  /// `"Day N"` or `"General"`.
  pub label:      String,
  pub day:        Option<u32>,
  /// Sorted by timestamp ascending.
  pub entries:    Vec<Entry>,
  pub total_time: f64,
  /// Case-folded, de-duplicated topics.
  pub topics:     BTreeSet<String>,
}

/// Rollup of one week.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekSummary {
  pub topics:     BTreeSet<String>,
  pub total_time: f64,
  /// Day groups ordered by day number, with "General" first.
  pub days:       Vec<DayGroup>,
}

/// Group entries by week, then by day, with topic and time rollups at both
/// levels. Weeks are ordered ascending.
pub fn group_for_overview(entries: &[Entry]) -> BTreeMap<u32, WeekSummary> {
  let mut by_week: BTreeMap<u32, Vec<&Entry>> = BTreeMap::new();
  for entry in entries {
    by_week.entry(entry.week).or_default().push(entry);
  }

  by_week
    .into_iter()
    .map(|(week, mut week_entries)| {
      // `None` sorts before every day, so "General" leads the week.
      week_entries.sort_by_key(|e| (e.day_number(), e.timestamp));

      let mut summary = WeekSummary {
        topics:     BTreeSet::new(),
        total_time: 0.0,
        days:       Vec::new(),
      };

      for entry in week_entries {
        let folded: Vec<String> = entry.topics.iter().map(|t| t.to_lowercase()).collect();
        summary.topics.extend(folded.iter().cloned());
        summary.total_time += entry.hours();

        // Entries are sorted by day, so a new day always starts a new group.
        let day = entry.day_number();
        let starts_group = summary.days.last().is_none_or(|g| g.day != day);
        if starts_group {
          summary.days.push(DayGroup {
            label:      entry.day_label(),
            day,
            entries:    Vec::new(),
            total_time: 0.0,
            topics:     BTreeSet::new(),
          });
        }
        if let Some(group) = summary.days.last_mut() {
          group.total_time += entry.hours();
          group.topics.extend(folded);
          group.entries.push(entry.clone());
        }
      }

      (week, summary)
    })
    .collect()
}
