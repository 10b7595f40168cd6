use thiserror::Error;

/// Recurrence rule validation errors.
///
/// These surface to callers as invalid-argument failures; the messages are
/// user-facing and stable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("unsupported recurrence frequency")]
    UnsupportedFrequency,

    #[error("invalid duration")]
    InvalidDuration,

    #[error("invalid time_zone")]
    InvalidTimeZone,

    #[error("invalid weekday")]
    InvalidWeekday,

    #[error("at least one weekday is required")]
    EmptyWeekdays,
}

pub type DomainResult<T> = std::result::Result<T, DomainError>;
