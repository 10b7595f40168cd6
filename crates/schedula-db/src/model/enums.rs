//! Database enum types with Diesel serialization.
//!
//! Type-safe wrappers for text columns constrained by CHECK constraints.
//! Each enum implements `ToSql` and `FromSql` for automatic conversion
//! between Rust and `PostgreSQL`, plus conversions to the pure domain enums.

use std::fmt;
use std::io::Write;

use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::{Pg, PgValue};
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;

/// Recurrence frequency.
///
/// Maps to `recurring_series.frequency` CHECK constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
pub enum Frequency {
    Weekly,
}

impl ToSql<Text, Pg> for Frequency {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        let s = match self {
            Self::Weekly => "weekly",
        };
        out.write_all(s.as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for Frequency {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"weekly" => Ok(Self::Weekly),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

impl Frequency {
    /// Returns the database string representation of this frequency.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Frequency> for schedula_domain::series::Frequency {
    fn from(db_freq: Frequency) -> Self {
        match db_freq {
            Frequency::Weekly => Self::Weekly,
        }
    }
}

impl From<schedula_domain::series::Frequency> for Frequency {
    fn from(freq: schedula_domain::series::Frequency) -> Self {
        match freq {
            schedula_domain::series::Frequency::Weekly => Self::Weekly,
        }
    }
}

/// Exception kind.
///
/// Maps to `recurring_exceptions.kind` CHECK constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
pub enum ExceptionKind {
    Skip,
    Override,
}

impl ToSql<Text, Pg> for ExceptionKind {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        let s = match self {
            Self::Skip => "skip",
            Self::Override => "override",
        };
        out.write_all(s.as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for ExceptionKind {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"skip" => Ok(Self::Skip),
            b"override" => Ok(Self::Override),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

impl ExceptionKind {
    /// Returns the database string representation of this exception kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Skip => "skip",
            Self::Override => "override",
        }
    }
}

impl fmt::Display for ExceptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ExceptionKind> for schedula_domain::exception::ExceptionKind {
    fn from(db_kind: ExceptionKind) -> Self {
        match db_kind {
            ExceptionKind::Skip => Self::Skip,
            ExceptionKind::Override => Self::Override,
        }
    }
}

impl From<schedula_domain::exception::ExceptionKind> for ExceptionKind {
    fn from(kind: schedula_domain::exception::ExceptionKind) -> Self {
        match kind {
            schedula_domain::exception::ExceptionKind::Skip => Self::Skip,
            schedula_domain::exception::ExceptionKind::Override => Self::Override,
        }
    }
}
