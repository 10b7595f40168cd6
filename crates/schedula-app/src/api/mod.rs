pub mod appointments;
mod appointments_tests;
pub mod error;
pub mod healthcheck;
pub mod types;

use salvo::Router;

pub use schedula_core::constants::{API_ROUTE_COMPONENT, API_ROUTE_PREFIX};

/// ## Summary
/// Constructs the main API router.
#[must_use]
pub fn routes() -> Router {
    Router::with_path(API_ROUTE_COMPONENT)
        .push(appointments::routes())
        .push(healthcheck::routes())
}
