//! Models for the appointments table.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::schema::appointments;

/// A one-off calendar entry bounded by `[start_time, end_time)`.
///
/// Rows are never mutated after creation; the database enforces both the
/// time-order check and the per-user overlap exclusion.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = appointments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Appointment {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub notes: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New appointment for insertion. Timestamps default in the database.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = appointments)]
pub struct NewAppointment {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub notes: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl NewAppointment {
    /// Payload equality used to recognize an idempotent replay: the stored
    /// row must match on owner, title, notes, and both instants.
    #[must_use]
    pub fn payload_matches(&self, existing: &Appointment) -> bool {
        existing.user_id == self.user_id
            && existing.title == self.title
            && existing.notes == self.notes
            && existing.start_time == self.start_time
            && existing.end_time == self.end_time
    }
}
