//! Calendar-day and dedup-key value objects for daily task generation.

use super::{StandId, TaskDomainError};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Storage format of a schedule day.
const DAY_FORMAT: &str = "%Y-%m-%d";

/// Prefix of dedup keys produced by the daily generator.
const DAILY_PREFIX: &str = "DAILY";

/// Maximum length of a dedup key stored in a `VARCHAR(255)` column.
const MAX_DEDUP_KEY_LENGTH: usize = 255;

/// Calendar day in the business timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScheduleDay(NaiveDate);

impl ScheduleDay {
    /// Wraps a calendar date.
    #[must_use]
    pub const fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Returns the day containing `reference` when viewed at `offset`.
    #[must_use]
    pub fn from_reference(reference: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self(reference.with_timezone(&offset).date_naive())
    }

    /// Parses a `YYYY-MM-DD` day.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidScheduleDay`] when the value is not a
    /// valid calendar date in that format.
    pub fn parse(value: &str) -> Result<Self, TaskDomainError> {
        NaiveDate::parse_from_str(value.trim(), DAY_FORMAT)
            .map(Self)
            .map_err(|_| TaskDomainError::InvalidScheduleDay(value.to_owned()))
    }

    /// Returns the wrapped date.
    #[must_use]
    pub const fn date(self) -> NaiveDate {
        self.0
    }

    /// Returns the following day, if representable.
    #[must_use]
    pub fn succ(self) -> Option<Self> {
        self.0.succ_opt().map(Self)
    }

    /// Returns the UTC instant at which this day starts at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidScheduleDay`] when the instant falls
    /// outside the representable range.
    pub fn start_utc(self, offset: FixedOffset) -> Result<DateTime<Utc>, TaskDomainError> {
        offset
            .from_local_datetime(&self.0.and_time(NaiveTime::MIN))
            .single()
            .map(|start| start.with_timezone(&Utc))
            .ok_or_else(|| TaskDomainError::InvalidScheduleDay(self.to_string()))
    }
}

impl fmt::Display for ScheduleDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DAY_FORMAT))
    }
}

/// Uniqueness token preventing duplicate task generation.
///
/// Daily keys have the exact shape `DAILY:{standId}:{YYYY-MM-DD}`; the store
/// enforces uniqueness, so two inserts with the same key never both succeed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DedupKey(String);

impl DedupKey {
    /// Builds the dedup key for a stand's daily task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidDedupKey`] when the stand identifier
    /// is too long for the key to fit the column.
    pub fn daily(stand_id: &StandId, day: ScheduleDay) -> Result<Self, TaskDomainError> {
        Self::new(format!("{DAILY_PREFIX}:{stand_id}:{day}"))
    }

    /// Creates a validated dedup key from a persisted or caller value.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidDedupKey`] when the value is empty or
    /// exceeds the column length.
    pub fn new(value: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        let normalized = raw.trim();
        if normalized.is_empty() || normalized.len() > MAX_DEDUP_KEY_LENGTH {
            return Err(TaskDomainError::InvalidDedupKey(raw));
        }
        Ok(Self(normalized.to_owned()))
    }

    /// Returns `true` when the key ends with `:{day}`.
    #[must_use]
    pub fn is_for_day(&self, day: ScheduleDay) -> bool {
        self.0
            .strip_suffix(&day.to_string())
            .is_some_and(|head| head.ends_with(':'))
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for DedupKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for DedupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
