//! Semester calendar used to derive the "current week" statistic.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

const WEEK_MILLIS: i64 = 7 * 24 * 60 * 60 * 1000;

/// A fixed semester start date and the last week number it runs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Semester {
  pub start:    NaiveDate,
  #[serde(default = "default_max_week")]
  pub max_week: u32,
}

fn default_max_week() -> u32 { 16 }

impl Default for Semester {
  fn default() -> Self {
    Self {
      start:    NaiveDate::from_ymd_opt(2025, 8, 4).unwrap_or_default(),
      max_week: default_max_week(),
    }
  }
}

impl Semester {
  /// Whole weeks elapsed between the start date (midnight UTC) and `now`,
  /// rounded up and clamped to `max_week`.
  ///
  /// The distance is absolute, so a `now` before the start counts the same
  /// number of weeks as one after it.
  pub fn current_week(&self, now: DateTime<Utc>) -> u32 {
    let start = self.start.and_time(chrono::NaiveTime::MIN).and_utc();
    let elapsed = (now - start).num_milliseconds().unsigned_abs();
    let weeks = elapsed.div_ceil(WEEK_MILLIS as u64);
    weeks.min(u64::from(self.max_week)) as u32
  }
}
