//! Models for the recurring exceptions table.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use schedula_domain::exception::RecurringException;
use uuid::Uuid;

use crate::db::schema::recurring_exceptions;
use crate::model::enums::ExceptionKind;
use crate::model::series::SeriesRow;

/// A stored skip/override modifier, keyed by the original scheduled start.
///
/// `(series_id, occurrence_start)` is unique; rows cascade away with their
/// parent series.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = recurring_exceptions)]
#[diesel(belongs_to(SeriesRow, foreign_key = series_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ExceptionRow {
    pub id: Uuid,
    pub series_id: Uuid,
    pub occurrence_start: DateTime<Utc>,
    pub kind: ExceptionKind,
    pub override_start: Option<DateTime<Utc>>,
    pub override_end: Option<DateTime<Utc>>,
    pub override_title: Option<String>,
    pub override_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ExceptionRow> for RecurringException {
    fn from(row: ExceptionRow) -> Self {
        Self {
            id: row.id,
            series_id: row.series_id,
            occurrence_start: row.occurrence_start,
            kind: row.kind.into(),
            override_start: row.override_start,
            override_end: row.override_end,
            override_title: row.override_title,
            override_notes: row.override_notes,
        }
    }
}

/// New exception for insertion or upsert. Timestamps default in the database.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = recurring_exceptions)]
pub struct NewException {
    pub id: Uuid,
    pub series_id: Uuid,
    pub occurrence_start: DateTime<Utc>,
    pub kind: ExceptionKind,
    pub override_start: Option<DateTime<Utc>>,
    pub override_end: Option<DateTime<Utc>>,
    pub override_title: Option<String>,
    pub override_notes: Option<String>,
}
