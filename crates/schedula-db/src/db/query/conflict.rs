//! Pre-insert conflict detection for a new series against the user's
//! existing calendar.
//!
//! The union of the inserting series's occurrence intervals, within a
//! bounded horizon, must be pairwise non-overlapping with itself and with
//! every existing appointment interval and exception-adjusted occurrence
//! interval of the user's other series. Abutting intervals are allowed
//! (half-open semantics).

use chrono::{DateTime, TimeDelta, Utc};
use schedula_core::constants::{CONFLICT_LOOKAHEAD_DAYS, EXCEPTION_WINDOW_BUFFER_DAYS};
use schedula_domain::exception::{apply_exceptions, RecurringException};
use schedula_domain::occurrence::Occurrence;
use schedula_domain::recurrence::generate_weekly_occurrences;
use schedula_domain::series::RecurringSeries;

use crate::db::connection::DbConnection;
use crate::db::query;
use crate::error::{DbError, DbResult};

#[derive(Debug, Clone, Copy)]
struct TimeSpan {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeSpan {
    fn overlaps(self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        start < self.end && end > self.start
    }
}

/// ## Summary
/// Verifies that `series` can be inserted without overlapping the user's
/// calendar. Must run inside the user's serialized transaction, immediately
/// before the insert.
///
/// The horizon is `[dtstart, dtstart + 180 days]`, truncated to `until`,
/// then extended by the last new occurrence's end so long-running existing
/// appointments intersecting the tail are still fetched. Exception lookups
/// use a ±14-day buffer around that window.
///
/// ## Errors
/// Returns [`DbError::Conflict`] on any overlap, or the underlying error if
/// expansion or a query fails.
pub async fn ensure_no_series_conflicts(
    conn: &mut DbConnection<'_>,
    series: &RecurringSeries,
) -> DbResult<()> {
    let window_start = series.dtstart;
    let mut window_end = window_start + TimeDelta::days(CONFLICT_LOOKAHEAD_DAYS);
    if let Some(until) = series.until {
        if until < window_end {
            window_end = until;
        }
    }
    window_end += TimeDelta::seconds(i64::from(series.duration_seconds));

    let mut new_occs = generate_weekly_occurrences(series, window_start, window_end)?;
    new_occs.sort_by_key(|o| o.start_time);
    let Some(last) = new_occs.last() else {
        return Ok(());
    };
    let window_end = last.end_time;

    if has_self_overlap(&new_occs) {
        return Err(DbError::Conflict);
    }

    let appts =
        query::appointments::list_for_window(conn, &series.user_id, window_start, window_end)
            .await?;
    let mut existing: Vec<TimeSpan> = appts
        .iter()
        .map(|a| TimeSpan {
            start: a.start_time,
            end: a.end_time,
        })
        .collect();

    let series_rows = query::series::list_for_user(conn, &series.user_id).await?;
    let ex_window_start = window_start - TimeDelta::days(EXCEPTION_WINDOW_BUFFER_DAYS);
    let ex_window_end = window_end + TimeDelta::days(EXCEPTION_WINDOW_BUFFER_DAYS);

    for row in series_rows {
        let other: RecurringSeries = (&row).into();
        let occs = generate_weekly_occurrences(&other, window_start, window_end)?;
        if occs.is_empty() {
            continue;
        }

        let exceptions: Vec<RecurringException> =
            query::series::list_exceptions(conn, other.id, ex_window_start, ex_window_end)
                .await?
                .into_iter()
                .map(Into::into)
                .collect();

        let occs = apply_exceptions(occs, &exceptions, window_start, window_end);
        existing.extend(occs.iter().map(|o| TimeSpan {
            start: o.start_time,
            end: o.end_time,
        }));
    }

    for occ in &new_occs {
        if existing
            .iter()
            .any(|span| span.overlaps(occ.start_time, occ.end_time))
        {
            tracing::debug!(
                user_id = %series.user_id,
                occurrence_start = %occ.start_time,
                "new series occurrence overlaps existing span"
            );
            return Err(DbError::Conflict);
        }
    }

    Ok(())
}

fn has_self_overlap(sorted: &[Occurrence]) -> bool {
    sorted
        .windows(2)
        .any(|pair| pair[0].end_time > pair[1].start_time)
}
