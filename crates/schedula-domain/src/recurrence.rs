//! Weekly recurrence expansion.
//!
//! The engine is pure: given a series and a half-open UTC window it produces
//! the finite, start-ascending sequence of occurrences whose intervals
//! intersect the window. Wall-clock times are preserved across DST
//! transitions by constructing each occurrence as a local date-time in the
//! series's zone and converting to UTC once, at emission.

use chrono::{
    DateTime, Datelike, Days, LocalResult, NaiveDate, NaiveDateTime, TimeDelta, TimeZone, Utc,
};
use chrono_tz::Tz;

use crate::error::{DomainError, DomainResult};
use crate::occurrence::{occurrence_id, Occurrence};
use crate::series::RecurringSeries;

/// ## Summary
/// Expands a weekly series into the occurrences intersecting
/// `[window_start, window_end)`.
///
/// Weeks are indexed from the Monday on-or-before `dtstart`'s local date;
/// `interval` counts whole weeks. Candidates earlier than `dtstart` are never
/// emitted, and the `count` cap is applied on a global index that excludes
/// those skipped first-week candidates. Generation stops at `until`
/// (inclusive), at the count cap, or at the window's week boundary.
///
/// ## Errors
/// Returns a [`DomainError`] when the rule itself is invalid: non-positive
/// duration, unknown time zone, weekday outside 1..7, or an empty weekday
/// set. Duplicate weekdays are deduplicated and `interval < 1` is normalized
/// to 1.
pub fn generate_weekly_occurrences(
    series: &RecurringSeries,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> DomainResult<Vec<Occurrence>> {
    if series.duration_seconds <= 0 {
        return Err(DomainError::InvalidDuration);
    }

    let tz: Tz = series
        .timezone
        .parse()
        .map_err(|_| DomainError::InvalidTimeZone)?;

    let dtstart_utc = series.dtstart;
    let dtstart_local = dtstart_utc.with_timezone(&tz);
    let duration = TimeDelta::seconds(i64::from(series.duration_seconds));

    let mut weekdays: Vec<i16> = Vec::with_capacity(series.byweekday.len());
    for &wd in &series.byweekday {
        if !(1..=7).contains(&wd) {
            return Err(DomainError::InvalidWeekday);
        }
        if !weekdays.contains(&wd) {
            weekdays.push(wd);
        }
    }
    if weekdays.is_empty() {
        return Err(DomainError::EmptyWeekdays);
    }
    weekdays.sort_unstable();

    let interval = i64::from(series.interval.max(1));

    let start_week_monday = monday_on_or_before(dtstart_local.date_naive());
    let window_start_week_monday =
        monday_on_or_before(window_start.with_timezone(&tz).date_naive());
    let window_end_week_boundary =
        monday_on_or_before(window_end.with_timezone(&tz).date_naive()) + Days::new(7);

    // Fast-forward whole interval periods that end before the window opens.
    let start_week_index = if window_start_week_monday > start_week_monday {
        let days_diff = (window_start_week_monday - start_week_monday).num_days();
        (days_diff / (7 * interval)).max(0)
    } else {
        0
    };

    let occ_per_week = weekdays.len() as i64;
    let local_time = dtstart_local.time();

    // Candidates in the anchor week that precede dtstart are never emitted;
    // the count index must not charge for them.
    let mut skipped_in_first_week = 0i64;
    for &wd in &weekdays {
        let occ_date = start_week_monday + Days::new(weekday_offset_from_monday(wd));
        let start_utc = resolve_local(tz, NaiveDateTime::new(occ_date, local_time));
        if start_utc < dtstart_utc {
            skipped_in_first_week += 1;
        }
    }

    let mut out = Vec::with_capacity(16);

    let mut week_index = start_week_index;
    loop {
        let week_monday = start_week_monday + Days::new((week_index * interval * 7) as u64);
        if week_monday >= window_end_week_boundary {
            break;
        }

        for (weekday_index, &wd) in weekdays.iter().enumerate() {
            let occ_date = week_monday + Days::new(weekday_offset_from_monday(wd));
            let start_utc = resolve_local(tz, NaiveDateTime::new(occ_date, local_time));
            if start_utc < dtstart_utc {
                continue;
            }

            if let Some(until) = series.until {
                if start_utc > until {
                    return Ok(out);
                }
            }

            if let Some(max_count) = series.count {
                let global_index =
                    week_index * occ_per_week + weekday_index as i64 - skipped_in_first_week;
                if global_index >= i64::from(max_count) {
                    return Ok(out);
                }
            }

            let end_utc = start_utc + duration;
            if start_utc < window_end && end_utc > window_start {
                out.push(Occurrence {
                    id: occurrence_id(start_utc),
                    series_id: series.id,
                    user_id: series.user_id.clone(),
                    title: series.title.clone(),
                    notes: series.notes.clone(),
                    start_time: start_utc,
                    end_time: end_utc,
                });
            }
        }

        week_index += 1;
    }

    Ok(out)
}

fn monday_on_or_before(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.weekday().num_days_from_monday()))
}

const fn weekday_offset_from_monday(weekday: i16) -> u64 {
    (weekday - 1) as u64
}

/// Maps a local wall-clock time in `tz` to UTC. Ambiguous times (fall-back
/// overlap) resolve to the earlier instant; times inside a spring-forward gap
/// resolve to the first valid wall clock after the gap.
fn resolve_local(tz: Tz, naive: NaiveDateTime) -> DateTime<Utc> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        LocalResult::None => {
            let mut probe = naive;
            for _ in 0..6 {
                probe += TimeDelta::minutes(30);
                if let LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) =
                    tz.from_local_datetime(&probe)
                {
                    return dt.with_timezone(&Utc);
                }
            }
            DateTime::from_naive_utc_and_offset(naive, Utc)
        }
    }
}
