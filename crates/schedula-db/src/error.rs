use thiserror::Error;

/// Database layer errors
#[derive(Error, Debug)]
pub enum DbError {
    /// The write would overlap an existing interval on the user's calendar.
    #[error("conflict")]
    Conflict,

    /// A row with the derived id exists but its payload differs.
    #[error("idempotency key conflict")]
    IdempotencyConflict,

    #[error("not found")]
    NotFound,

    #[error("Database error: {0}")]
    DatabaseError(#[from] diesel::result::Error),

    #[error("Pool error: {0}")]
    PoolError(#[from] diesel_async::pooled_connection::bb8::RunError),

    #[error(transparent)]
    DomainError(#[from] schedula_domain::error::DomainError),
}

pub type DbResult<T> = std::result::Result<T, DbError>;
