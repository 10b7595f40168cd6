//! Per-occurrence exception application.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::occurrence::{unix_nanos, Occurrence};

/// Exception kind: drop the occurrence entirely, or rewrite parts of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExceptionKind {
    Skip,
    Override,
}

impl ExceptionKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Skip => "skip",
            Self::Override => "override",
        }
    }
}

impl std::fmt::Display for ExceptionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A per-occurrence modifier, keyed by the original scheduled start instant.
#[derive(Debug, Clone, PartialEq)]
pub struct RecurringException {
    pub id: Uuid,
    pub series_id: Uuid,
    /// UTC instant of the originally scheduled occurrence. Matching is by
    /// exact nanosecond identity; near-miss instants do not match.
    pub occurrence_start: DateTime<Utc>,
    pub kind: ExceptionKind,
    pub override_start: Option<DateTime<Utc>>,
    pub override_end: Option<DateTime<Utc>>,
    pub override_title: Option<String>,
    pub override_notes: Option<String>,
}

/// ## Summary
/// Applies skip/override exceptions to a generated occurrence stream.
///
/// Occurrences without a matching exception pass through unchanged. A skip
/// drops its occurrence; an override replaces whichever of start, end, title,
/// and notes it carries, then re-tests the mutated interval against
/// `[window_start, window_end)` and drops it when the intersection is empty.
/// Input order is preserved modulo drops.
#[must_use]
pub fn apply_exceptions(
    occurrences: Vec<Occurrence>,
    exceptions: &[RecurringException],
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> Vec<Occurrence> {
    if exceptions.is_empty() {
        return occurrences;
    }

    let mut by_occurrence_start: HashMap<i128, &RecurringException> =
        HashMap::with_capacity(exceptions.len());
    for ex in exceptions {
        by_occurrence_start.insert(unix_nanos(ex.occurrence_start), ex);
    }

    let mut out = Vec::with_capacity(occurrences.len());
    for occ in occurrences {
        let Some(ex) = by_occurrence_start.get(&unix_nanos(occ.start_time)) else {
            out.push(occ);
            continue;
        };

        if ex.kind == ExceptionKind::Skip {
            continue;
        }

        let start = ex.override_start.unwrap_or(occ.start_time);
        let end = ex.override_end.unwrap_or(occ.end_time);
        let title = ex.override_title.clone().unwrap_or(occ.title);
        let notes = ex.override_notes.clone().unwrap_or(occ.notes);

        if start < window_end && end > window_start {
            out.push(Occurrence {
                id: occ.id,
                series_id: occ.series_id,
                user_id: occ.user_id,
                title,
                notes,
                start_time: start,
                end_time: end,
            });
        }
    }

    out
}
