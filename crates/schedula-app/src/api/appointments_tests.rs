//! Unit tests for the appointment handlers.

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};
    use salvo::http::StatusCode;
    use salvo::test::{ResponseExt, TestClient};
    use salvo::{Router, Service};
    use uuid::Uuid;

    use schedula_db::error::{DbError, DbResult};
    use schedula_db::model::appointment::Appointment;
    use schedula_db::model::series::SeriesRow;
    use schedula_db::store::{AppointmentDraft, CalendarStore};
    use schedula_domain::idempotency::appointment_id_for_key;
    use schedula_domain::occurrence::{occurrence_id, Occurrence};
    use schedula_domain::series::RecurringSeries;
    use schedula_service::appointments::AppointmentService;

    use crate::api;
    use crate::service_handler::ServiceHandler;

    #[derive(Default)]
    struct FakeStore {
        fail_create_with: Mutex<Option<DbError>>,
        fail_delete_with: Mutex<Option<DbError>>,
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
    }

    #[async_trait]
    impl CalendarStore for FakeStore {
        async fn create_appointment(&self, draft: AppointmentDraft) -> DbResult<Appointment> {
            if let Some(err) = self.fail_create_with.lock().unwrap().take() {
                return Err(err);
            }
            Ok(Appointment {
                id: draft.id.unwrap_or_else(Uuid::now_v7),
                user_id: draft.user_id,
                title: draft.title,
                notes: draft.notes,
                start_time: draft.start_time,
                end_time: draft.end_time,
                created_at: fixed_now(),
                updated_at: fixed_now(),
            })
        }

        async fn list_appointments(
            &self,
            user_id: &str,
            window_start: DateTime<Utc>,
            _window_end: DateTime<Utc>,
        ) -> DbResult<Vec<Appointment>> {
            Ok(vec![Appointment {
                id: Uuid::now_v7(),
                user_id: user_id.to_string(),
                title: "listed".to_string(),
                notes: String::new(),
                start_time: window_start,
                end_time: window_start + chrono::TimeDelta::hours(1),
                created_at: fixed_now(),
                updated_at: fixed_now(),
            }])
        }

        async fn delete_appointment(&self, _user_id: &str, _appointment_id: Uuid) -> DbResult<()> {
            if let Some(err) = self.fail_delete_with.lock().unwrap().take() {
                return Err(err);
            }
            Ok(())
        }

        async fn create_series(&self, series: RecurringSeries) -> DbResult<SeriesRow> {
            Ok(SeriesRow {
                id: Uuid::now_v7(),
                user_id: series.user_id,
                title: series.title,
                notes: series.notes,
                timezone: series.timezone,
                dtstart: series.dtstart,
                duration_seconds: series.duration_seconds,
                frequency: series.frequency.into(),
                interval: series.interval,
                byweekday: series.byweekday,
                until: series.until,
                count: series.count,
                created_at: fixed_now(),
                updated_at: fixed_now(),
            })
        }

        async fn list_occurrences(
            &self,
            user_id: &str,
            window_start: DateTime<Utc>,
            _window_end: DateTime<Utc>,
        ) -> DbResult<Vec<Occurrence>> {
            Ok(vec![Occurrence {
                id: occurrence_id(window_start),
                series_id: Uuid::now_v7(),
                user_id: user_id.to_string(),
                title: "standup".to_string(),
                notes: String::new(),
                start_time: window_start,
                end_time: window_start + chrono::TimeDelta::hours(1),
            }])
        }
    }

    fn service_with(store: FakeStore) -> Service {
        let service = Arc::new(AppointmentService::new(Arc::new(store)));
        let router = Router::new()
            .hoop(ServiceHandler { service })
            .push(api::routes());
        Service::new(router)
    }

    fn create_body() -> serde_json::Value {
        serde_json::json!({
            "user_id": "u1",
            "title": "t",
            "start_time": "2026-01-01T10:00:00Z",
            "end_time": "2026-01-01T11:00:00Z",
        })
    }

    #[tokio::test]
    async fn create_returns_created_with_payload() {
        let service = service_with(FakeStore::default());

        let mut resp = TestClient::post("http://127.0.0.1:5800/api/appointments")
            .json(&create_body())
            .send(&service)
            .await;

        assert_eq!(resp.status_code, Some(StatusCode::CREATED));
        let body = resp.take_json::<serde_json::Value>().await.unwrap();
        assert_eq!(body["user_id"], "u1");
        assert_eq!(body["start_time"], "2026-01-01T10:00:00Z");
        assert!(Uuid::parse_str(body["id"].as_str().unwrap()).is_ok());
    }

    #[tokio::test]
    async fn create_requires_time_fields() {
        let service = service_with(FakeStore::default());

        let resp = TestClient::post("http://127.0.0.1:5800/api/appointments")
            .json(&serde_json::json!({"user_id": "u1", "title": "t"}))
            .send(&service)
            .await;

        assert_eq!(resp.status_code, Some(StatusCode::BAD_REQUEST));
    }

    #[tokio::test]
    async fn create_maps_validation_errors_to_bad_request() {
        let service = service_with(FakeStore::default());

        let mut body = create_body();
        body["title"] = serde_json::json!("   ");
        let mut resp = TestClient::post("http://127.0.0.1:5800/api/appointments")
            .json(&body)
            .send(&service)
            .await;

        assert_eq!(resp.status_code, Some(StatusCode::BAD_REQUEST));
        let body = resp.take_json::<serde_json::Value>().await.unwrap();
        assert_eq!(body["error"], "title is required");
    }

    #[tokio::test]
    async fn create_maps_conflict_to_conflict_status() {
        let store = FakeStore {
            fail_create_with: Mutex::new(Some(DbError::Conflict)),
            ..FakeStore::default()
        };
        let service = service_with(store);

        let mut resp = TestClient::post("http://127.0.0.1:5800/api/appointments")
            .json(&create_body())
            .send(&service)
            .await;

        assert_eq!(resp.status_code, Some(StatusCode::CONFLICT));
        let body = resp.take_json::<serde_json::Value>().await.unwrap();
        assert_eq!(
            body["error"],
            "You already have an appointment during that time. Pick a different slot."
        );
    }

    #[tokio::test]
    async fn idempotency_header_fixes_the_appointment_id() {
        let service = service_with(FakeStore::default());
        let expected = appointment_id_for_key("u1", "k1").to_string();

        let mut resp = TestClient::post("http://127.0.0.1:5800/api/appointments")
            .add_header("Idempotency-Key", "k1", true)
            .json(&create_body())
            .send(&service)
            .await;
        let body = resp.take_json::<serde_json::Value>().await.unwrap();
        assert_eq!(body["id"], expected);

        // The alternate header name is equivalent.
        let mut resp = TestClient::post("http://127.0.0.1:5800/api/appointments")
            .add_header("X-Idempotency-Key", " k1 ", true)
            .json(&create_body())
            .send(&service)
            .await;
        let body = resp.take_json::<serde_json::Value>().await.unwrap();
        assert_eq!(body["id"], expected);
    }

    #[tokio::test]
    async fn list_requires_window_params() {
        let service = service_with(FakeStore::default());

        let resp = TestClient::get("http://127.0.0.1:5800/api/appointments?user_id=u1")
            .send(&service)
            .await;

        assert_eq!(resp.status_code, Some(StatusCode::BAD_REQUEST));
    }

    #[tokio::test]
    async fn list_returns_appointments() {
        let service = service_with(FakeStore::default());

        let mut resp = TestClient::get(
            "http://127.0.0.1:5800/api/appointments?user_id=u1\
             &window_start=2026-01-01T00:00:00Z&window_end=2026-01-02T00:00:00Z",
        )
        .send(&service)
        .await;

        assert_eq!(resp.status_code, Some(StatusCode::OK));
        let body = resp.take_json::<serde_json::Value>().await.unwrap();
        assert_eq!(body["appointments"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_validates_the_id_format() {
        let service = service_with(FakeStore::default());

        let resp = TestClient::delete(
            "http://127.0.0.1:5800/api/appointments/not-a-uuid?user_id=u1",
        )
        .send(&service)
        .await;

        assert_eq!(resp.status_code, Some(StatusCode::BAD_REQUEST));
    }

    #[tokio::test]
    async fn delete_maps_not_found() {
        let store = FakeStore {
            fail_delete_with: Mutex::new(Some(DbError::NotFound)),
            ..FakeStore::default()
        };
        let service = service_with(store);

        let url = format!(
            "http://127.0.0.1:5800/api/appointments/{}?user_id=u1",
            Uuid::now_v7()
        );
        let mut resp = TestClient::delete(&url).send(&service).await;

        assert_eq!(resp.status_code, Some(StatusCode::NOT_FOUND));
        let body = resp.take_json::<serde_json::Value>().await.unwrap();
        assert_eq!(body["error"], "appointment not found");
    }

    #[tokio::test]
    async fn delete_returns_no_content() {
        let service = service_with(FakeStore::default());

        let url = format!(
            "http://127.0.0.1:5800/api/appointments/{}?user_id=u1",
            Uuid::now_v7()
        );
        let resp = TestClient::delete(&url).send(&service).await;

        assert_eq!(resp.status_code, Some(StatusCode::NO_CONTENT));
    }

    #[tokio::test]
    async fn create_series_returns_rule_echo() {
        let service = service_with(FakeStore::default());

        let body = serde_json::json!({
            "user_id": "u1",
            "title": "standup",
            "start_time": "2026-01-05T09:00:00Z",
            "end_time": "2026-01-05T10:00:00Z",
            "weekly": {
                "interval": 1,
                "weekdays": [0, 1],
                "time_zone": "UTC",
                "count": 4,
            },
        });

        let mut resp = TestClient::post("http://127.0.0.1:5800/api/recurring-series")
            .json(&body)
            .send(&service)
            .await;

        assert_eq!(resp.status_code, Some(StatusCode::CREATED));
        let body = resp.take_json::<serde_json::Value>().await.unwrap();
        // The unspecified weekday (0) is ignored.
        assert_eq!(body["weekly"]["weekdays"], serde_json::json!([1]));
        assert_eq!(body["weekly"]["count"], 4);
        assert_eq!(body["end_time"], "2026-01-05T10:00:00Z");
    }

    #[tokio::test]
    async fn list_occurrences_returns_nanosecond_ids() {
        let service = service_with(FakeStore::default());

        let mut resp = TestClient::get(
            "http://127.0.0.1:5800/api/occurrences?user_id=u1\
             &window_start=2026-01-05T00:00:00Z&window_end=2026-01-12T00:00:00Z",
        )
        .send(&service)
        .await;

        assert_eq!(resp.status_code, Some(StatusCode::OK));
        let body = resp.take_json::<serde_json::Value>().await.unwrap();
        let occurrences = body["occurrences"].as_array().unwrap();
        assert_eq!(occurrences.len(), 1);
        let start = Utc.with_ymd_and_hms(2026, 1, 5, 0, 0, 0).unwrap();
        assert_eq!(occurrences[0]["occurrence_id"], occurrence_id(start));
    }
}
