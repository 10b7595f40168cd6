//! Postgres integration tests.
//!
//! Skipped unless `SCHEDULA_TEST_DATABASE_URL` is set. Each run applies the
//! workspace migrations into a throwaway schema so the real exclusion
//! constraint, advisory-lock transaction path, and idempotency resolution are
//! exercised end to end.

use std::time::Duration;

use chrono::{TimeZone, Utc};
use diesel_async::SimpleAsyncConnection;
use schedula_db::db::connection::{create_pool, DbPool, PoolOptions};
use schedula_db::db::query;
use schedula_db::error::DbError;
use schedula_db::model::enums::ExceptionKind;
use schedula_db::model::exception::NewException;
use schedula_db::store::{AppointmentDraft, CalendarStore, PgCalendarStore};
use schedula_domain::series::{Frequency, RecurringSeries};
use uuid::Uuid;

async fn test_pool(schema: &str) -> Option<DbPool> {
    let Ok(url) = std::env::var("SCHEDULA_TEST_DATABASE_URL") else {
        eprintln!("SCHEDULA_TEST_DATABASE_URL not set; skipping");
        return None;
    };

    let pool = create_pool(
        &url,
        PoolOptions {
            max_size: 1,
            min_idle: 1,
            max_lifetime: Duration::from_secs(1800),
            idle_timeout: Duration::from_secs(300),
        },
    )
    .await
    .expect("pool");

    {
        let mut conn = pool.get().await.expect("connection");
        conn.batch_execute(&format!(
            "CREATE SCHEMA {schema}; SET search_path TO {schema}, public;"
        ))
        .await
        .expect("create schema");

        for sql in migration_sql() {
            conn.batch_execute(&sql).await.expect("apply migration");
        }
    }

    Some(pool)
}

fn migration_sql() -> Vec<String> {
    let dir = format!("{}/../../migrations", env!("CARGO_MANIFEST_DIR"));
    let mut entries: Vec<_> = std::fs::read_dir(dir)
        .expect("migrations directory")
        .filter_map(Result::ok)
        .filter(|e| e.path().is_dir())
        .collect();
    entries.sort_by_key(std::fs::DirEntry::file_name);

    entries
        .into_iter()
        .map(|e| std::fs::read_to_string(e.path().join("up.sql")).expect("up.sql"))
        .collect()
}

async fn drop_schema(pool: &DbPool, schema: &str) {
    if let Ok(mut conn) = pool.get().await {
        let _ = conn
            .batch_execute(&format!("DROP SCHEMA IF EXISTS {schema} CASCADE"))
            .await;
    }
}

fn draft(user_id: &str, title: &str, start: chrono::DateTime<Utc>, hours: i64) -> AppointmentDraft {
    AppointmentDraft {
        id: None,
        user_id: user_id.to_string(),
        title: title.to_string(),
        notes: String::new(),
        start_time: start,
        end_time: start + chrono::TimeDelta::hours(hours),
    }
}

fn weekly_series(user_id: &str, dtstart: chrono::DateTime<Utc>) -> RecurringSeries {
    RecurringSeries {
        id: Uuid::nil(),
        user_id: user_id.to_string(),
        title: "standup".to_string(),
        notes: String::new(),
        timezone: "UTC".to_string(),
        dtstart,
        duration_seconds: 3600,
        frequency: Frequency::Weekly,
        interval: 1,
        byweekday: vec![1],
        until: None,
        count: None,
    }
}

#[tokio::test]
async fn appointment_create_list_overlap_and_idempotency() {
    let schema = format!("schedula_test_{}", Uuid::now_v7().simple());
    let Some(pool) = test_pool(&schema).await else {
        return;
    };
    let store = PgCalendarStore::new(pool.clone());

    let start = Utc.with_ymd_and_hms(2026, 1, 1, 10, 0, 0).unwrap();
    let end = start + chrono::TimeDelta::hours(1);

    // Create and list.
    let a1 = store
        .create_appointment(draft("u1", "t", start, 1))
        .await
        .expect("create");
    assert!(!a1.id.is_nil());

    let rows = store
        .list_appointments(
            "u1",
            start - chrono::TimeDelta::minutes(1),
            end + chrono::TimeDelta::minutes(1),
        )
        .await
        .expect("list");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, a1.id);

    // Overlapping insert is rejected by the exclusion constraint.
    let err = store
        .create_appointment(draft(
            "u1",
            "t2",
            start + chrono::TimeDelta::minutes(30),
            1,
        ))
        .await
        .expect_err("overlap");
    assert!(matches!(err, DbError::Conflict), "got {err:?}");

    // Abutting insert succeeds (half-open intervals).
    store
        .create_appointment(draft("u1", "t3", end, 1))
        .await
        .expect("abutting create");

    // Idempotent replay with the same id and payload returns the prior row.
    let replay = store
        .create_appointment(AppointmentDraft {
            id: Some(a1.id),
            user_id: "u1".to_string(),
            title: "t".to_string(),
            notes: String::new(),
            start_time: start,
            end_time: end,
        })
        .await
        .expect("replay");
    assert_eq!(replay.id, a1.id);

    // Same id with a different payload is an idempotency conflict.
    let err = store
        .create_appointment(AppointmentDraft {
            id: Some(a1.id),
            user_id: "u1".to_string(),
            title: "different".to_string(),
            notes: String::new(),
            start_time: start,
            end_time: end,
        })
        .await
        .expect_err("payload mismatch");
    assert!(matches!(err, DbError::IdempotencyConflict), "got {err:?}");

    // Delete: unknown id reports not-found, existing id removes the row.
    let err = store
        .delete_appointment("u1", Uuid::now_v7())
        .await
        .expect_err("missing row");
    assert!(matches!(err, DbError::NotFound), "got {err:?}");
    store
        .delete_appointment("u1", a1.id)
        .await
        .expect("delete");

    drop_schema(&pool, &schema).await;
}

#[tokio::test]
async fn series_conflict_expansion_and_exception_cascade() {
    let schema = format!("schedula_test_{}", Uuid::now_v7().simple());
    let Some(pool) = test_pool(&schema).await else {
        return;
    };
    let store = PgCalendarStore::new(pool.clone());

    // An appointment sitting inside a future Monday occurrence.
    let blocker_start = Utc.with_ymd_and_hms(2026, 1, 12, 9, 30, 0).unwrap();
    store
        .create_appointment(AppointmentDraft {
            id: None,
            user_id: "u2".to_string(),
            title: "dentist".to_string(),
            notes: String::new(),
            start_time: blocker_start,
            end_time: blocker_start + chrono::TimeDelta::minutes(15),
        })
        .await
        .expect("blocker");

    let mut series = weekly_series("u2", Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap());
    series.until = Some(Utc.with_ymd_and_hms(2026, 1, 20, 0, 0, 0).unwrap());
    let err = store.create_series(series).await.expect_err("conflict");
    assert!(matches!(err, DbError::Conflict), "got {err:?}");

    // A clean series inserts and expands.
    let dtstart = Utc.with_ymd_and_hms(2026, 2, 2, 9, 0, 0).unwrap();
    let mut series = weekly_series("u3", dtstart);
    series.count = Some(4);
    let created = store.create_series(series).await.expect("create series");

    let window_start = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
    let window_end = Utc.with_ymd_and_hms(2026, 3, 15, 0, 0, 0).unwrap();
    let occs = store
        .list_occurrences("u3", window_start, window_end)
        .await
        .expect("occurrences");
    assert_eq!(occs.len(), 4);
    assert_eq!(occs[0].start_time, dtstart);

    // A skip exception removes exactly its occurrence from reads.
    let skipped_start = Utc.with_ymd_and_hms(2026, 2, 9, 9, 0, 0).unwrap();
    {
        let mut conn = pool.get().await.expect("connection");
        query::series::upsert_exception(
            &mut conn,
            &NewException {
                id: Uuid::now_v7(),
                series_id: created.id,
                occurrence_start: skipped_start,
                kind: ExceptionKind::Skip,
                override_start: None,
                override_end: None,
                override_title: None,
                override_notes: None,
            },
        )
        .await
        .expect("upsert exception");
    }

    let occs = store
        .list_occurrences("u3", window_start, window_end)
        .await
        .expect("occurrences after skip");
    assert_eq!(occs.len(), 3);
    assert!(occs.iter().all(|o| o.start_time != skipped_start));

    // Series deletion cascades to its exceptions.
    {
        let mut conn = pool.get().await.expect("connection");
        query::series::delete_for_user(&mut conn, "u3", created.id)
            .await
            .expect("delete series");
        let leftovers = query::series::list_exceptions(
            &mut conn,
            created.id,
            window_start - chrono::TimeDelta::days(30),
            window_end + chrono::TimeDelta::days(30),
        )
        .await
        .expect("list exceptions");
        assert!(leftovers.is_empty());
    }

    drop_schema(&pool, &schema).await;
}
