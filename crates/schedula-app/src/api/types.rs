//! Request and response payloads for the appointment API.
//!
//! Instants are RFC 3339 strings in UTC (the JSON projection of the wire
//! (seconds, nanos) pair). Appointment and series ids travel as canonical
//! dashed UUID strings; occurrence ids as base-10 nanosecond strings.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use schedula_db::model::appointment::Appointment;
use schedula_db::model::series::SeriesRow;
use schedula_domain::occurrence::Occurrence;

/// Error response payload
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateAppointmentRequest {
    pub user_id: String,
    pub title: String,
    #[serde(default)]
    pub notes: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateRecurringSeriesRequest {
    pub user_id: String,
    pub title: String,
    #[serde(default)]
    pub notes: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub weekly: WeeklyRecurrenceRequest,
}

#[derive(Debug, Default, Deserialize)]
pub struct WeeklyRecurrenceRequest {
    #[serde(default)]
    pub interval: i32,
    /// Weekdays 1=Monday .. 7=Sunday; zero (unspecified) values are ignored.
    #[serde(default)]
    pub weekdays: Vec<i16>,
    pub time_zone: String,
    #[serde(default)]
    pub until: Option<DateTime<Utc>>,
    #[serde(default)]
    pub count: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct AppointmentResponse {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub notes: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Appointment> for AppointmentResponse {
    fn from(appointment: Appointment) -> Self {
        Self {
            id: appointment.id.to_string(),
            user_id: appointment.user_id,
            title: appointment.title,
            notes: appointment.notes,
            start_time: appointment.start_time,
            end_time: appointment.end_time,
            created_at: appointment.created_at,
            updated_at: appointment.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListAppointmentsResponse {
    pub appointments: Vec<AppointmentResponse>,
}

#[derive(Debug, Serialize)]
pub struct WeeklyRecurrenceResponse {
    pub interval: i32,
    pub weekdays: Vec<i16>,
    pub time_zone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub until: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct RecurringSeriesResponse {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub notes: String,
    /// First occurrence template: dtstart and dtstart + duration.
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub weekly: WeeklyRecurrenceResponse,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SeriesRow> for RecurringSeriesResponse {
    fn from(row: SeriesRow) -> Self {
        let duration = TimeDelta::seconds(i64::from(row.duration_seconds));
        Self {
            id: row.id.to_string(),
            user_id: row.user_id,
            title: row.title,
            notes: row.notes,
            start_time: row.dtstart,
            end_time: row.dtstart + duration,
            weekly: WeeklyRecurrenceResponse {
                interval: row.interval,
                weekdays: row.byweekday,
                time_zone: row.timezone,
                until: row.until,
                count: row.count,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OccurrenceResponse {
    pub occurrence_id: String,
    pub series_id: String,
    pub user_id: String,
    pub title: String,
    pub notes: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl From<Occurrence> for OccurrenceResponse {
    fn from(occurrence: Occurrence) -> Self {
        Self {
            occurrence_id: occurrence.id,
            series_id: occurrence.series_id.to_string(),
            user_id: occurrence.user_id,
            title: occurrence.title,
            notes: occurrence.notes,
            start_time: occurrence.start_time,
            end_time: occurrence.end_time,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListOccurrencesResponse {
    pub occurrences: Vec<OccurrenceResponse>,
}
