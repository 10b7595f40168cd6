use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A single derived calendar entry belonging to a series.
///
/// Occurrences are value objects computed at read time; they are never
/// persisted and carry no identity beyond their scheduled start instant.
#[derive(Debug, Clone, PartialEq)]
pub struct Occurrence {
    /// Base-10 string of the scheduled start instant in UTC nanoseconds.
    pub id: String,
    pub series_id: Uuid,
    pub user_id: String,
    pub title: String,
    pub notes: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// ## Summary
/// Returns the UTC nanosecond timestamp of an instant.
///
/// Computed in 128 bits so the full `chrono` range is representable; within
/// the i64 nanosecond range this matches a plain Unix-nano encoding.
#[must_use]
pub fn unix_nanos(t: DateTime<Utc>) -> i128 {
    i128::from(t.timestamp()) * 1_000_000_000 + i128::from(t.timestamp_subsec_nanos())
}

/// ## Summary
/// Derives the canonical occurrence id from a scheduled start instant.
///
/// This identity is shared between the recurrence engine, the exception
/// matcher, and clients.
#[must_use]
pub fn occurrence_id(start: DateTime<Utc>) -> String {
    unix_nanos(start).to_string()
}
