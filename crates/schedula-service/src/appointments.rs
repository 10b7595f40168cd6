//! Validation, normalization, and orchestration for calendar operations.

use std::sync::Arc;

use chrono::{DateTime, Datelike, TimeDelta, Utc};
use chrono_tz::Tz;
use schedula_core::constants::{
    CONFLICT_LOOKAHEAD_DAYS, MAX_APPOINTMENT_DURATION_SECS, MAX_IDEMPOTENCY_KEY_BYTES,
};
use schedula_db::model::appointment::Appointment;
use schedula_db::model::series::SeriesRow;
use schedula_db::store::{AppointmentDraft, CalendarStore};
use schedula_domain::idempotency::appointment_id_for_key;
use schedula_domain::occurrence::Occurrence;
use schedula_domain::recurrence::generate_weekly_occurrences;
use schedula_domain::series::{Frequency, RecurringSeries};
use uuid::Uuid;

use crate::error::{validation_error, ServiceResult};

/// Orchestrates validation and store access for the appointment RPCs.
pub struct AppointmentService {
    store: Arc<dyn CalendarStore>,
}

#[derive(Debug, Clone)]
pub struct CreateAppointmentInput {
    pub user_id: String,
    pub title: String,
    pub notes: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Raw header value; empty means absent.
    pub idempotency_key: String,
}

#[derive(Debug, Clone)]
pub struct CreateRecurringSeriesInput {
    pub user_id: String,
    pub title: String,
    pub notes: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub rule: RecurrenceRuleInput,
}

#[derive(Debug, Clone, Default)]
pub struct RecurrenceRuleInput {
    /// Absent or empty defaults to weekly.
    pub frequency: Option<String>,
    /// Zero is normalized to 1.
    pub interval: i32,
    /// Empty defaults to the weekday of `start_time` in the series zone.
    pub byweekday: Vec<i16>,
    pub until: Option<DateTime<Utc>>,
    pub count: Option<i32>,
    pub time_zone: String,
}

impl AppointmentService {
    #[must_use]
    pub fn new(store: Arc<dyn CalendarStore>) -> Self {
        Self { store }
    }

    /// ## Summary
    /// Creates a one-off appointment after validating and normalizing the
    /// input. With an idempotency key the appointment id is derived
    /// deterministically from `(user, key)`, so retries converge on one row.
    ///
    /// ## Errors
    /// Returns a validation error for bad input, a conflict when the interval
    /// overlaps the user's calendar, or an idempotency conflict when the
    /// derived id exists with a different payload.
    #[tracing::instrument(skip(self, input), fields(user_id = %input.user_id))]
    pub async fn create(&self, input: CreateAppointmentInput) -> ServiceResult<Appointment> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(validation_error("title is required"));
        }
        if input.user_id.is_empty() {
            return Err(validation_error("user_id is required"));
        }

        let start = input.start_time;
        let end = input.end_time;
        if end <= start {
            return Err(validation_error("end_time must be after start_time"));
        }
        if end - start > TimeDelta::seconds(MAX_APPOINTMENT_DURATION_SECS) {
            return Err(validation_error("duration too long"));
        }

        let key = input.idempotency_key.trim();
        let id = if key.is_empty() {
            None
        } else {
            if key.len() > MAX_IDEMPOTENCY_KEY_BYTES {
                return Err(validation_error("idempotency_key too long"));
            }
            Some(appointment_id_for_key(&input.user_id, key))
        };

        let draft = AppointmentDraft {
            id,
            user_id: input.user_id,
            title: title.to_string(),
            notes: input.notes,
            start_time: start,
            end_time: end,
        };

        Ok(self.store.create_appointment(draft).await?)
    }

    /// ## Summary
    /// Lists appointments intersecting `[window_start, window_end)`.
    ///
    /// ## Errors
    /// Returns a validation error for an empty user or reversed window.
    #[tracing::instrument(skip(self))]
    pub async fn list(
        &self,
        user_id: &str,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> ServiceResult<Vec<Appointment>> {
        if user_id.is_empty() {
            return Err(validation_error("user_id is required"));
        }
        if window_end <= window_start {
            return Err(validation_error("window_end must be after window_start"));
        }

        Ok(self
            .store
            .list_appointments(user_id, window_start, window_end)
            .await?)
    }

    /// ## Summary
    /// Deletes an appointment keyed by `(user, appointment id)`.
    ///
    /// ## Errors
    /// Returns a validation error for an empty user or nil id, or not-found
    /// when no row matches.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, user_id: &str, appointment_id: Uuid) -> ServiceResult<()> {
        if user_id.is_empty() {
            return Err(validation_error("user_id is required"));
        }
        if appointment_id.is_nil() {
            return Err(validation_error("appointment_id is required"));
        }

        Ok(self.store.delete_appointment(user_id, appointment_id).await?)
    }

    /// ## Summary
    /// Creates a weekly recurring series: normalizes the rule, verifies the
    /// horizon admits at least one occurrence (and enough for `count`), then
    /// hands the series to the store for the serialized conflict check and
    /// insert.
    ///
    /// ## Errors
    /// Returns a validation error for any rule violation, or a conflict when
    /// an expanded occurrence overlaps the user's calendar.
    #[tracing::instrument(skip(self, input), fields(user_id = %input.user_id))]
    pub async fn create_recurring_series(
        &self,
        input: CreateRecurringSeriesInput,
    ) -> ServiceResult<SeriesRow> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(validation_error("title is required"));
        }
        if input.user_id.is_empty() {
            return Err(validation_error("user_id is required"));
        }

        let frequency = match input.rule.frequency.as_deref() {
            None | Some("") => Frequency::Weekly,
            Some(raw) => raw
                .parse::<Frequency>()
                .map_err(|_| validation_error("unsupported frequency"))?,
        };

        let tz_name = input.rule.time_zone.trim();
        if tz_name.is_empty() {
            return Err(validation_error("time_zone is required"));
        }
        let tz: Tz = tz_name
            .parse()
            .map_err(|_| validation_error("invalid time_zone"))?;

        let start = input.start_time;
        let end = input.end_time;
        if end <= start {
            return Err(validation_error("end_time must be after start_time"));
        }
        if end - start > TimeDelta::seconds(MAX_APPOINTMENT_DURATION_SECS) {
            return Err(validation_error("duration too long"));
        }
        let duration = end - start;
        let duration_seconds = duration.num_seconds() as i32;

        let interval = match input.rule.interval {
            0 => 1,
            i if i < 1 => return Err(validation_error("interval must be at least 1")),
            i => i,
        };

        let mut weekdays = input.rule.byweekday;
        if weekdays.is_empty() {
            weekdays = vec![start.with_timezone(&tz).weekday().number_from_monday() as i16];
        }

        let mut normalized: Vec<i16> = Vec::with_capacity(weekdays.len());
        for wd in weekdays {
            if !(1..=7).contains(&wd) {
                return Err(validation_error("invalid weekday"));
            }
            if !normalized.contains(&wd) {
                normalized.push(wd);
            }
        }
        if normalized.is_empty() {
            return Err(validation_error("at least one weekday is required"));
        }
        normalized.sort_unstable();

        let until = match input.rule.until {
            Some(u) if u < start => {
                return Err(validation_error("until must be after start_time"));
            }
            other => other,
        };

        let count = match input.rule.count {
            Some(c) if c < 1 => return Err(validation_error("count must be at least 1")),
            other => other,
        };

        if until.is_none() && count.is_none() {
            return Err(validation_error("until or count is required"));
        }

        let series = RecurringSeries {
            id: Uuid::nil(),
            user_id: input.user_id,
            title: title.to_string(),
            notes: input.notes,
            timezone: tz_name.to_string(),
            dtstart: start,
            duration_seconds,
            frequency,
            interval,
            byweekday: normalized,
            until,
            count,
        };

        let lookahead_end = start + TimeDelta::days(CONFLICT_LOOKAHEAD_DAYS);

        if count.is_none() {
            if let Some(u) = until {
                if u > lookahead_end {
                    return Err(validation_error(
                        "until must be within 180 days of start_time",
                    ));
                }
            }
        }

        let mut occ_limit_end = lookahead_end;
        if let Some(u) = until {
            if u < occ_limit_end {
                occ_limit_end = u;
            }
        }

        // Count the occurrences available in the horizon, ignoring the
        // requested count cap itself.
        let mut series_for_count = series.clone();
        series_for_count.until = Some(occ_limit_end);
        series_for_count.count = None;
        let available =
            generate_weekly_occurrences(&series_for_count, start, occ_limit_end + duration)
                .map_err(|err| validation_error(err.to_string()))?;

        if available.is_empty() {
            return Err(validation_error("recurrence rule produces no occurrences"));
        }
        if let Some(c) = count {
            if c as usize > available.len() {
                if until.is_some_and(|u| u < lookahead_end) {
                    return Err(validation_error(
                        "count exceeds occurrences available before until",
                    ));
                }
                return Err(validation_error(
                    "count exceeds occurrences available within 180 days of start_time",
                ));
            }
        }

        Ok(self.store.create_series(series).await?)
    }

    /// ## Summary
    /// Lists the exception-adjusted occurrences of every series intersecting
    /// `[window_start, window_end)`, sorted by start ascending.
    ///
    /// ## Errors
    /// Returns a validation error for an empty user or reversed window.
    #[tracing::instrument(skip(self))]
    pub async fn list_occurrences(
        &self,
        user_id: &str,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> ServiceResult<Vec<Occurrence>> {
        if user_id.is_empty() {
            return Err(validation_error("user_id is required"));
        }
        if window_end <= window_start {
            return Err(validation_error("window_end must be after window_start"));
        }

        Ok(self
            .store
            .list_occurrences(user_id, window_start, window_end)
            .await?)
    }
}
