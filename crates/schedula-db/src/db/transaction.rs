//! Per-user transactional unit.
//!
//! Every write path for a user's calendar runs inside a transaction whose
//! first statement takes `pg_advisory_xact_lock(hashtext(user_id))`, so all
//! mutations for that user serialize behind one another across every server
//! instance. The lock is released by Postgres at commit or rollback. Reads
//! never take the lock.

use diesel_async::scoped_futures::{ScopedBoxFuture, ScopedFutureExt};
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::db::connection::DbConnection;
use crate::error::{DbError, DbResult};

/// ## Summary
/// Runs `callback` inside a transaction that is serialized on the user's
/// advisory lock.
///
/// ## Errors
/// Returns any error produced by the callback, or errors raised while
/// starting or committing the transaction.
pub async fn with_user_transaction<'a, 'conn, T, F>(
    conn: &'a mut DbConnection<'conn>,
    user_id: &str,
    callback: F,
) -> DbResult<T>
where
    F: for<'r> FnOnce(&'r mut DbConnection<'conn>) -> ScopedBoxFuture<'conn, 'r, DbResult<T>>
        + Send
        + 'a
        + 'conn,
    T: Send + 'a,
{
    let user_id = user_id.to_owned();
    conn.transaction::<T, DbError, _>(|conn| {
        async move {
            lock_user_calendar(conn, &user_id).await?;
            callback(conn).await
        }
        .scope_boxed()
    })
    .await
}

/// Serializes writers of one user's calendar. `hashtext` gives a stable
/// 32-bit key per user id, shared by every instance talking to the same
/// database.
async fn lock_user_calendar(conn: &mut DbConnection<'_>, user_id: &str) -> DbResult<()> {
    diesel::sql_query("SELECT pg_advisory_xact_lock(hashtext($1))")
        .bind::<diesel::sql_types::Text, _>(user_id)
        .execute(conn)
        .await?;
    Ok(())
}
