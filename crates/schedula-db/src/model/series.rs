//! Models for the recurring series table.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use schedula_domain::series::RecurringSeries;
use uuid::Uuid;

use crate::db::schema::recurring_series;
use crate::model::enums::Frequency;

/// Stored recurrence rule.
///
/// `dtstart` holds a UTC instant, but expansion correctness depends on the
/// `timezone` name stored alongside it; the pairing must be preserved.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = recurring_series)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SeriesRow {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub notes: String,
    pub timezone: String,
    pub dtstart: DateTime<Utc>,
    pub duration_seconds: i32,
    pub frequency: Frequency,
    pub interval: i32,
    pub byweekday: Vec<i16>,
    pub until: Option<DateTime<Utc>>,
    pub count: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&SeriesRow> for RecurringSeries {
    fn from(row: &SeriesRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id.clone(),
            title: row.title.clone(),
            notes: row.notes.clone(),
            timezone: row.timezone.clone(),
            dtstart: row.dtstart,
            duration_seconds: row.duration_seconds,
            frequency: row.frequency.into(),
            interval: row.interval,
            byweekday: row.byweekday.clone(),
            until: row.until,
            count: row.count,
        }
    }
}

/// New series for insertion. Timestamps default in the database.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = recurring_series)]
pub struct NewSeries {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub notes: String,
    pub timezone: String,
    pub dtstart: DateTime<Utc>,
    pub duration_seconds: i32,
    pub frequency: Frequency,
    pub interval: i32,
    pub byweekday: Vec<i16>,
    pub until: Option<DateTime<Utc>>,
    pub count: Option<i32>,
}

impl NewSeries {
    #[must_use]
    pub fn from_domain(series: &RecurringSeries, id: Uuid) -> Self {
        Self {
            id,
            user_id: series.user_id.clone(),
            title: series.title.clone(),
            notes: series.notes.clone(),
            timezone: series.timezone.clone(),
            dtstart: series.dtstart,
            duration_seconds: series.duration_seconds,
            frequency: series.frequency.into(),
            interval: series.interval,
            byweekday: series.byweekday.clone(),
            until: series.until,
            count: series.count,
        }
    }
}
