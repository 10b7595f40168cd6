use salvo::async_trait;
use std::sync::Arc;

use schedula_core::error::CoreError;
use schedula_service::appointments::AppointmentService;

use crate::error::AppResult;

/// Injects the shared [`AppointmentService`] into every request's depot.
pub struct ServiceHandler {
    pub service: Arc<AppointmentService>,
}

#[async_trait]
impl salvo::Handler for ServiceHandler {
    #[tracing::instrument(skip(self, _req, depot, _res, _ctrl))]
    async fn handle(
        &self,
        _req: &mut salvo::Request,
        depot: &mut salvo::Depot,
        _res: &mut salvo::Response,
        _ctrl: &mut salvo::FlowCtrl,
    ) {
        depot.inject(self.service.clone());
    }
}

/// ## Summary
/// Retrieves the appointment service from the depot.
///
/// ## Errors
/// Returns an error if the service is not found in the depot.
pub fn get_service_from_depot(depot: &salvo::Depot) -> AppResult<Arc<AppointmentService>> {
    depot
        .obtain::<Arc<AppointmentService>>()
        .cloned()
        .map_err(|_err| {
            CoreError::InvariantViolation("Appointment service not found in depot").into()
        })
}
