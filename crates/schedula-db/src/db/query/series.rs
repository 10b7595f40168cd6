//! Query composition for `recurring_series` and `recurring_exceptions`.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::db::connection::DbConnection;
use crate::db::schema::{recurring_exceptions, recurring_series};
use crate::error::{DbError, DbResult};
use crate::model::exception::{ExceptionRow, NewException};
use crate::model::series::{NewSeries, SeriesRow};

/// ## Summary
/// Inserts a recurring series.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn insert(conn: &mut DbConnection<'_>, new: &NewSeries) -> DbResult<SeriesRow> {
    let row = diesel::insert_into(recurring_series::table)
        .values(new)
        .returning(SeriesRow::as_returning())
        .get_result::<SeriesRow>(conn)
        .await?;
    Ok(row)
}

/// ## Summary
/// Lists every series belonging to a user, ordered by `dtstart` ascending.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn list_for_user(conn: &mut DbConnection<'_>, user_id: &str) -> DbResult<Vec<SeriesRow>> {
    let rows = recurring_series::table
        .filter(recurring_series::user_id.eq(user_id))
        .order(recurring_series::dtstart.asc())
        .select(SeriesRow::as_select())
        .load(conn)
        .await?;
    Ok(rows)
}

/// ## Summary
/// Lists a user's series whose `dtstart` precedes `bound`. Series starting at
/// or after the bound cannot produce occurrences inside a window ending there.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn list_starting_before(
    conn: &mut DbConnection<'_>,
    user_id: &str,
    bound: DateTime<Utc>,
) -> DbResult<Vec<SeriesRow>> {
    let rows = recurring_series::table
        .filter(recurring_series::user_id.eq(user_id))
        .filter(recurring_series::dtstart.lt(bound))
        .select(SeriesRow::as_select())
        .load(conn)
        .await?;
    Ok(rows)
}

/// ## Summary
/// Lists exceptions for a series whose `occurrence_start` lies in
/// `[window_start, window_end)`.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn list_exceptions(
    conn: &mut DbConnection<'_>,
    series_id: Uuid,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> DbResult<Vec<ExceptionRow>> {
    let rows = recurring_exceptions::table
        .filter(recurring_exceptions::series_id.eq(series_id))
        .filter(recurring_exceptions::occurrence_start.ge(window_start))
        .filter(recurring_exceptions::occurrence_start.lt(window_end))
        .select(ExceptionRow::as_select())
        .load(conn)
        .await?;
    Ok(rows)
}

/// ## Summary
/// Inserts or updates an exception keyed on `(series_id, occurrence_start)`.
///
/// Not exposed through the RPC surface yet; retained so exceptions written by
/// operational tooling keep the same shape a future API will use.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn upsert_exception(
    conn: &mut DbConnection<'_>,
    new: &NewException,
) -> DbResult<ExceptionRow> {
    let row = diesel::insert_into(recurring_exceptions::table)
        .values(new)
        .on_conflict((
            recurring_exceptions::series_id,
            recurring_exceptions::occurrence_start,
        ))
        .do_update()
        .set((
            recurring_exceptions::kind.eq(excluded(recurring_exceptions::kind)),
            recurring_exceptions::override_start.eq(excluded(recurring_exceptions::override_start)),
            recurring_exceptions::override_end.eq(excluded(recurring_exceptions::override_end)),
            recurring_exceptions::override_title.eq(excluded(recurring_exceptions::override_title)),
            recurring_exceptions::override_notes.eq(excluded(recurring_exceptions::override_notes)),
        ))
        .returning(ExceptionRow::as_returning())
        .get_result::<ExceptionRow>(conn)
        .await?;
    Ok(row)
}

/// ## Summary
/// Deletes a series keyed by `(user_id, series_id)`; exceptions cascade away
/// with it. Not exposed through the RPC surface yet.
///
/// ## Errors
/// Returns [`DbError::NotFound`] if no row was affected.
pub async fn delete_for_user(
    conn: &mut DbConnection<'_>,
    user_id: &str,
    series_id: Uuid,
) -> DbResult<()> {
    let affected = diesel::delete(
        recurring_series::table
            .filter(recurring_series::user_id.eq(user_id))
            .filter(recurring_series::id.eq(series_id)),
    )
    .execute(conn)
    .await?;

    if affected == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}
