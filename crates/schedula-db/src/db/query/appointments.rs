//! Query composition for `appointments`.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::db::connection::DbConnection;
use crate::db::schema::appointments;
use crate::error::{DbError, DbResult};
use crate::model::appointment::{Appointment, NewAppointment};

/// Name of the partitioned exclusion constraint over
/// `(user_id, tstzrange(start_time, end_time, '[)'))`.
pub const OVERLAP_CONSTRAINT: &str = "appointments_no_overlap";

/// ## Summary
/// Inserts an appointment, classifying constraint failures.
///
/// An exclusion-constraint failure becomes [`DbError::Conflict`]. A
/// unique-id failure is resolved as an idempotent replay: the existing row
/// is returned when its payload matches the request, otherwise
/// [`DbError::IdempotencyConflict`] is raised.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn insert(conn: &mut DbConnection<'_>, new: &NewAppointment) -> DbResult<Appointment> {
    let inserted = diesel::insert_into(appointments::table)
        .values(new)
        .returning(Appointment::as_returning())
        .get_result::<Appointment>(conn)
        .await;

    match inserted {
        Ok(row) => Ok(row),
        Err(diesel::result::Error::DatabaseError(kind, info)) => {
            if info.constraint_name() == Some(OVERLAP_CONSTRAINT) {
                return Err(DbError::Conflict);
            }
            if matches!(kind, DatabaseErrorKind::UniqueViolation) {
                return resolve_idempotent_replay(conn, new).await;
            }
            Err(DbError::DatabaseError(
                diesel::result::Error::DatabaseError(kind, info),
            ))
        }
        Err(err) => Err(err.into()),
    }
}

async fn resolve_idempotent_replay(
    conn: &mut DbConnection<'_>,
    new: &NewAppointment,
) -> DbResult<Appointment> {
    let existing = appointments::table
        .find(new.id)
        .select(Appointment::as_select())
        .first::<Appointment>(conn)
        .await?;

    if new.payload_matches(&existing) {
        tracing::debug!(appointment_id = %existing.id, "idempotent replay matched existing row");
        Ok(existing)
    } else {
        Err(DbError::IdempotencyConflict)
    }
}

/// ## Summary
/// Lists a user's appointments intersecting `[window_start, window_end)`,
/// ordered by start ascending.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn list_for_window(
    conn: &mut DbConnection<'_>,
    user_id: &str,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> DbResult<Vec<Appointment>> {
    let rows = appointments::table
        .filter(appointments::user_id.eq(user_id))
        .filter(appointments::start_time.lt(window_end))
        .filter(appointments::end_time.gt(window_start))
        .order(appointments::start_time.asc())
        .select(Appointment::as_select())
        .load(conn)
        .await?;
    Ok(rows)
}

/// ## Summary
/// Deletes an appointment keyed by `(user_id, appointment_id)`.
///
/// ## Errors
/// Returns [`DbError::NotFound`] if no row was affected.
pub async fn delete(
    conn: &mut DbConnection<'_>,
    user_id: &str,
    appointment_id: Uuid,
) -> DbResult<()> {
    let affected = diesel::delete(
        appointments::table
            .filter(appointments::user_id.eq(user_id))
            .filter(appointments::id.eq(appointment_id)),
    )
    .execute(conn)
    .await?;

    if affected == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}
