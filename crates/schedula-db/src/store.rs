//! The calendar store seam between the service layer and durable state.

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use diesel_async::scoped_futures::ScopedFutureExt;
use schedula_core::constants::EXCEPTION_WINDOW_BUFFER_DAYS;
use schedula_domain::exception::{apply_exceptions, RecurringException};
use schedula_domain::occurrence::Occurrence;
use schedula_domain::recurrence::generate_weekly_occurrences;
use schedula_domain::series::RecurringSeries;
use uuid::Uuid;

use crate::db::connection::DbPool;
use crate::db::query;
use crate::db::query::conflict::ensure_no_series_conflicts;
use crate::db::transaction::with_user_transaction;
use crate::error::DbResult;
use crate::model::appointment::{Appointment, NewAppointment};
use crate::model::series::{NewSeries, SeriesRow};

/// A create request as it leaves the service layer. When `id` is absent a
/// fresh time-ordered id is generated at insert time; an idempotency-derived
/// id arrives already set.
#[derive(Debug, Clone)]
pub struct AppointmentDraft {
    pub id: Option<Uuid>,
    pub user_id: String,
    pub title: String,
    pub notes: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// Durable calendar operations.
///
/// Writes serialize per user behind the database advisory lock; reads go
/// straight to a snapshot without taking it.
#[async_trait]
pub trait CalendarStore: Send + Sync {
    async fn create_appointment(&self, draft: AppointmentDraft) -> DbResult<Appointment>;

    async fn list_appointments(
        &self,
        user_id: &str,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> DbResult<Vec<Appointment>>;

    async fn delete_appointment(&self, user_id: &str, appointment_id: Uuid) -> DbResult<()>;

    async fn create_series(&self, series: RecurringSeries) -> DbResult<SeriesRow>;

    async fn list_occurrences(
        &self,
        user_id: &str,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> DbResult<Vec<Occurrence>>;
}

/// Postgres-backed [`CalendarStore`].
#[derive(Clone)]
pub struct PgCalendarStore {
    pool: DbPool,
}

impl PgCalendarStore {
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CalendarStore for PgCalendarStore {
    #[tracing::instrument(skip(self, draft), fields(user_id = %draft.user_id))]
    async fn create_appointment(&self, draft: AppointmentDraft) -> DbResult<Appointment> {
        let row = NewAppointment {
            id: draft.id.unwrap_or_else(Uuid::now_v7),
            user_id: draft.user_id,
            title: draft.title,
            notes: draft.notes,
            start_time: draft.start_time,
            end_time: draft.end_time,
        };
        let user_id = row.user_id.clone();

        let mut conn = self.pool.get().await?;
        with_user_transaction(&mut conn, &user_id, |conn| {
            async move { query::appointments::insert(conn, &row).await }.scope_boxed()
        })
        .await
    }

    #[tracing::instrument(skip(self))]
    async fn list_appointments(
        &self,
        user_id: &str,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> DbResult<Vec<Appointment>> {
        let mut conn = self.pool.get().await?;
        query::appointments::list_for_window(&mut conn, user_id, window_start, window_end).await
    }

    #[tracing::instrument(skip(self))]
    async fn delete_appointment(&self, user_id: &str, appointment_id: Uuid) -> DbResult<()> {
        let mut conn = self.pool.get().await?;
        let owner = user_id.to_owned();
        with_user_transaction(&mut conn, user_id, |conn| {
            async move { query::appointments::delete(conn, &owner, appointment_id).await }
                .scope_boxed()
        })
        .await
    }

    #[tracing::instrument(skip(self, series), fields(user_id = %series.user_id))]
    async fn create_series(&self, series: RecurringSeries) -> DbResult<SeriesRow> {
        let id = if series.id.is_nil() {
            Uuid::now_v7()
        } else {
            series.id
        };
        let user_id = series.user_id.clone();

        let mut conn = self.pool.get().await?;
        with_user_transaction(&mut conn, &user_id, |conn| {
            async move {
                ensure_no_series_conflicts(conn, &series).await?;
                let row = NewSeries::from_domain(&series, id);
                query::series::insert(conn, &row).await
            }
            .scope_boxed()
        })
        .await
    }

    #[tracing::instrument(skip(self))]
    async fn list_occurrences(
        &self,
        user_id: &str,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> DbResult<Vec<Occurrence>> {
        let mut conn = self.pool.get().await?;
        let series_rows = query::series::list_starting_before(&mut conn, user_id, window_end).await?;

        let ex_window_start = window_start - TimeDelta::days(EXCEPTION_WINDOW_BUFFER_DAYS);
        let ex_window_end = window_end + TimeDelta::days(EXCEPTION_WINDOW_BUFFER_DAYS);

        let mut out: Vec<Occurrence> = Vec::with_capacity(series_rows.len());
        for row in &series_rows {
            let series: RecurringSeries = row.into();
            let occs = generate_weekly_occurrences(&series, window_start, window_end)?;
            if occs.is_empty() {
                continue;
            }

            let exceptions: Vec<RecurringException> =
                query::series::list_exceptions(&mut conn, series.id, ex_window_start, ex_window_end)
                    .await?
                    .into_iter()
                    .map(Into::into)
                    .collect();

            out.extend(apply_exceptions(occs, &exceptions, window_start, window_end));
        }

        out.sort_by(|a, b| a.start_time.cmp(&b.start_time));
        Ok(out)
    }
}
