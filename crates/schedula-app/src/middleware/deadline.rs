//! Per-request deadline enforcement.

use std::time::Duration;

use salvo::async_trait;
use salvo::http::StatusCode;
use salvo::writing::Json;

use schedula_core::constants::REQUEST_TIMEOUT_HEADER;

use crate::api::types::ErrorResponse;

/// Bounds every handler under a deadline. Callers may shorten the default
/// via the `x-request-timeout-ms` header; when the deadline elapses the
/// remaining pipeline is cancelled at its next await point and the request
/// fails with 504. Aborted transactions roll back, so no partial state is
/// committed.
pub struct DeadlineMiddleware {
    default_timeout: Duration,
}

impl DeadlineMiddleware {
    #[must_use]
    pub fn new(default_timeout: Duration) -> Self {
        Self { default_timeout }
    }

    fn timeout_for(&self, req: &salvo::Request) -> Duration {
        req.headers()
            .get(REQUEST_TIMEOUT_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok())
            .filter(|&millis| millis > 0)
            .map_or(self.default_timeout, Duration::from_millis)
    }
}

#[async_trait]
impl salvo::Handler for DeadlineMiddleware {
    async fn handle(
        &self,
        req: &mut salvo::Request,
        depot: &mut salvo::Depot,
        res: &mut salvo::Response,
        ctrl: &mut salvo::FlowCtrl,
    ) {
        let timeout = self.timeout_for(req);

        if tokio::time::timeout(timeout, ctrl.call_next(req, depot, res))
            .await
            .is_err()
        {
            tracing::warn!(
                timeout_ms = timeout.as_millis() as u64,
                path = %req.uri().path(),
                "request deadline exceeded"
            );
            res.status_code(StatusCode::GATEWAY_TIMEOUT);
            res.render(Json(ErrorResponse {
                error: "deadline exceeded".to_string(),
            }));
        }
    }
}
