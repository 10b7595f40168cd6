//! Error-kind to HTTP status mapping.
//!
//! This is the only place that knows the transport mapping; the service
//! returns typed kinds and the conflict messages are rendered verbatim.

use salvo::http::StatusCode;
use salvo::writing::Json;
use salvo::Response;

use schedula_service::error::ServiceError;

use crate::api::types::ErrorResponse;

/// ## Summary
/// Renders a service error as the matching HTTP status and JSON body.
///
/// Validation maps to 400, both conflict kinds to 409, not-found to 404,
/// everything else to 500 with a generic message.
pub fn render_service_error(res: &mut Response, err: &ServiceError) {
    let (status, message) = match err {
        ServiceError::Validation(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        ServiceError::Conflict | ServiceError::IdempotencyConflict => {
            (StatusCode::CONFLICT, err.to_string())
        }
        ServiceError::NotFound => (StatusCode::NOT_FOUND, err.to_string()),
        ServiceError::Internal(source) => {
            tracing::error!(error = %source, "request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal error".to_string(),
            )
        }
    };

    res.status_code(status);
    res.render(Json(ErrorResponse { error: message }));
}

/// Renders a 400 with the given message.
pub fn render_bad_request(res: &mut Response, message: &str) {
    res.status_code(StatusCode::BAD_REQUEST);
    res.render(Json(ErrorResponse {
        error: message.to_string(),
    }));
}

/// Renders a 500 for faults in the adapter itself.
pub fn render_internal_error(res: &mut Response) {
    res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
    res.render(Json(ErrorResponse {
        error: "internal error".to_string(),
    }));
}
