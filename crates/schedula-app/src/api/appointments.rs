//! Handlers for the appointment RPC surface.

use chrono::{DateTime, Utc};
use salvo::http::StatusCode;
use salvo::writing::Json;
use salvo::{handler, Depot, Request, Response, Router};
use uuid::Uuid;

use schedula_core::constants::{IDEMPOTENCY_KEY_HEADER, IDEMPOTENCY_KEY_HEADER_ALT};
use schedula_service::appointments::{
    CreateAppointmentInput, CreateRecurringSeriesInput, RecurrenceRuleInput,
};

use crate::api::error::{render_bad_request, render_internal_error, render_service_error};
use crate::api::types::{
    AppointmentResponse, CreateAppointmentRequest, CreateRecurringSeriesRequest,
    ListAppointmentsResponse, ListOccurrencesResponse, OccurrenceResponse,
    RecurringSeriesResponse,
};
use crate::service_handler::get_service_from_depot;

/// Reads the idempotency key from either accepted header name; the first
/// present header wins, and its value is trimmed.
fn idempotency_key(req: &Request) -> String {
    for name in [IDEMPOTENCY_KEY_HEADER, IDEMPOTENCY_KEY_HEADER_ALT] {
        if let Some(value) = req.headers().get(name) {
            return value
                .to_str()
                .map(|raw| raw.trim().to_string())
                .unwrap_or_default();
        }
    }
    String::new()
}

fn window_params(req: &Request) -> Result<(DateTime<Utc>, DateTime<Utc>), &'static str> {
    let start = req
        .query::<String>("window_start")
        .ok_or("window_start and window_end are required")?;
    let end = req
        .query::<String>("window_end")
        .ok_or("window_start and window_end are required")?;

    let start = DateTime::parse_from_rfc3339(&start)
        .map_err(|_| "window_start must be an RFC 3339 timestamp")?
        .with_timezone(&Utc);
    let end = DateTime::parse_from_rfc3339(&end)
        .map_err(|_| "window_end must be an RFC 3339 timestamp")?
        .with_timezone(&Utc);

    Ok((start, end))
}

#[handler]
async fn create_appointment(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let Ok(service) = get_service_from_depot(depot) else {
        render_internal_error(res);
        return;
    };

    let body: CreateAppointmentRequest = match req.parse_json().await {
        Ok(body) => body,
        Err(err) => {
            tracing::warn!(error = ?err, "invalid create appointment request body");
            render_bad_request(res, "Invalid request body");
            return;
        }
    };

    let input = CreateAppointmentInput {
        user_id: body.user_id,
        title: body.title,
        notes: body.notes,
        start_time: body.start_time,
        end_time: body.end_time,
        idempotency_key: idempotency_key(req),
    };

    match service.create(input).await {
        Ok(appointment) => {
            tracing::info!(
                appointment_id = %appointment.id,
                user_id = %appointment.user_id,
                "appointment created"
            );
            res.status_code(StatusCode::CREATED);
            res.render(Json(AppointmentResponse::from(appointment)));
        }
        Err(err) => render_service_error(res, &err),
    }
}

#[handler]
async fn list_appointments(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let Ok(service) = get_service_from_depot(depot) else {
        render_internal_error(res);
        return;
    };

    let user_id = req.query::<String>("user_id").unwrap_or_default();
    let (window_start, window_end) = match window_params(req) {
        Ok(window) => window,
        Err(message) => {
            render_bad_request(res, message);
            return;
        }
    };

    match service.list(&user_id, window_start, window_end).await {
        Ok(appointments) => {
            tracing::debug!(user_id = %user_id, count = appointments.len(), "appointments listed");
            res.render(Json(ListAppointmentsResponse {
                appointments: appointments
                    .into_iter()
                    .map(AppointmentResponse::from)
                    .collect(),
            }));
        }
        Err(err) => render_service_error(res, &err),
    }
}

#[handler]
async fn delete_appointment(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let Ok(service) = get_service_from_depot(depot) else {
        render_internal_error(res);
        return;
    };

    let Some(raw_id) = req.param::<String>("appointment_id") else {
        render_bad_request(res, "appointment_id is required");
        return;
    };
    let Ok(appointment_id) = Uuid::parse_str(&raw_id) else {
        render_bad_request(res, "appointment_id must be a UUID");
        return;
    };
    let user_id = req.query::<String>("user_id").unwrap_or_default();

    match service.delete(&user_id, appointment_id).await {
        Ok(()) => {
            tracing::info!(appointment_id = %appointment_id, user_id = %user_id, "appointment deleted");
            res.status_code(StatusCode::NO_CONTENT);
        }
        Err(err) => render_service_error(res, &err),
    }
}

#[handler]
async fn create_recurring_series(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let Ok(service) = get_service_from_depot(depot) else {
        render_internal_error(res);
        return;
    };

    let body: CreateRecurringSeriesRequest = match req.parse_json().await {
        Ok(body) => body,
        Err(err) => {
            tracing::warn!(error = ?err, "invalid create series request body");
            render_bad_request(res, "Invalid request body");
            return;
        }
    };

    let input = CreateRecurringSeriesInput {
        user_id: body.user_id,
        title: body.title,
        notes: body.notes,
        start_time: body.start_time,
        end_time: body.end_time,
        rule: RecurrenceRuleInput {
            frequency: None,
            interval: body.weekly.interval,
            // Unspecified (zero) weekday values are ignored.
            byweekday: body
                .weekly
                .weekdays
                .into_iter()
                .filter(|&wd| wd != 0)
                .collect(),
            until: body.weekly.until,
            count: body.weekly.count.filter(|&count| count != 0),
            time_zone: body.weekly.time_zone,
        },
    };

    match service.create_recurring_series(input).await {
        Ok(series) => {
            tracing::info!(series_id = %series.id, user_id = %series.user_id, "recurring series created");
            res.status_code(StatusCode::CREATED);
            res.render(Json(RecurringSeriesResponse::from(series)));
        }
        Err(err) => render_service_error(res, &err),
    }
}

#[handler]
async fn list_occurrences(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let Ok(service) = get_service_from_depot(depot) else {
        render_internal_error(res);
        return;
    };

    let user_id = req.query::<String>("user_id").unwrap_or_default();
    let (window_start, window_end) = match window_params(req) {
        Ok(window) => window,
        Err(message) => {
            render_bad_request(res, message);
            return;
        }
    };

    match service
        .list_occurrences(&user_id, window_start, window_end)
        .await
    {
        Ok(occurrences) => {
            tracing::debug!(user_id = %user_id, count = occurrences.len(), "occurrences listed");
            res.render(Json(ListOccurrencesResponse {
                occurrences: occurrences
                    .into_iter()
                    .map(OccurrenceResponse::from)
                    .collect(),
            }));
        }
        Err(err) => render_service_error(res, &err),
    }
}

#[must_use]
pub fn routes() -> Router {
    Router::new()
        .push(
            Router::with_path("appointments")
                .post(create_appointment)
                .get(list_appointments)
                .push(Router::with_path("{appointment_id}").delete(delete_appointment)),
        )
        .push(Router::with_path("recurring-series").post(create_recurring_series))
        .push(Router::with_path("occurrences").get(list_occurrences))
}
