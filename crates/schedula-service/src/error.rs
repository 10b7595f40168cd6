use schedula_db::error::DbError;
use thiserror::Error;

/// Service layer errors: the sealed taxonomy the RPC adapter maps to
/// transport statuses. Conflict messages are plain user-facing strings so UI
/// layers can render them verbatim.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Input fails a service-level precondition. Carries a human-readable
    /// message.
    #[error("{0}")]
    Validation(String),

    /// Overlap detected by the insertion path or the pre-insert series check.
    #[error("You already have an appointment during that time. Pick a different slot.")]
    Conflict,

    /// A prior row with the derived id exists but its payload differs.
    #[error("This request key was already used for a different appointment. Try again.")]
    IdempotencyConflict,

    #[error("appointment not found")]
    NotFound,

    #[error("internal error: {0}")]
    Internal(#[source] DbError),
}

impl From<DbError> for ServiceError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Conflict => Self::Conflict,
            DbError::IdempotencyConflict => Self::IdempotencyConflict,
            DbError::NotFound => Self::NotFound,
            other => Self::Internal(other),
        }
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

pub(crate) fn validation_error(msg: impl Into<String>) -> ServiceError {
    ServiceError::Validation(msg.into())
}
