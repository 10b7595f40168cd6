use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Recurrence frequency. Only weekly rules are supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frequency {
    Weekly,
}

impl Frequency {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Frequency {
    type Err = crate::error::DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weekly" => Ok(Self::Weekly),
            _ => Err(crate::error::DomainError::UnsupportedFrequency),
        }
    }
}

/// A weekly recurring series.
///
/// `dtstart` is stored as a UTC instant, but expansion correctness depends on
/// the `timezone` name stored alongside it: the local wall-clock time of
/// `dtstart` in that zone is what every occurrence preserves.
#[derive(Debug, Clone, PartialEq)]
pub struct RecurringSeries {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub notes: String,
    /// IANA time zone identifier, e.g. `America/New_York`.
    pub timezone: String,
    pub dtstart: DateTime<Utc>,
    pub duration_seconds: i32,
    pub frequency: Frequency,
    /// Whole weeks between selected weeks; values below 1 are normalized to 1.
    pub interval: i32,
    /// Weekdays encoded 1=Monday .. 7=Sunday.
    pub byweekday: Vec<i16>,
    /// Inclusive upper bound on occurrence starts, UTC.
    pub until: Option<DateTime<Utc>>,
    pub count: Option<i32>,
}
