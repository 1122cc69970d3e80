//! Storage errors shared by every store implementation.

use std::borrow::Cow;

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

/// `serialization_failure`
const SERIALIZATION_FAILURE: &str = "40001";

/// `deadlock_detected`
const DEADLOCK_DETECTED: &str = "40P01";

/// `query_canceled`, raised when `statement_timeout` fires.
const QUERY_CANCELED: &str = "57014";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("record already exists")]
    AlreadyExists,

    #[error("related resource not found")]
    InvalidReference,

    #[error("invalid data")]
    InvalidData,

    #[error("transaction conflict")]
    Conflict,

    #[error("storage operation timed out")]
    Timeout,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl StoreError {
    /// Whether retrying the whole unit of work may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Conflict | Self::Timeout)
    }
}

impl From<Error> for StoreError {
    fn from(error: Error) -> Self {
        match error {
            Error::RowNotFound => return Self::NotFound,
            Error::PoolTimedOut => return Self::Timeout,
            _ => {}
        }

        let code = error
            .as_database_error()
            .and_then(DatabaseError::code)
            .map(Cow::into_owned);

        match code.as_deref() {
            Some(SERIALIZATION_FAILURE | DEADLOCK_DETECTED) => return Self::Conflict,
            Some(QUERY_CANCELED) => return Self::Timeout,
            _ => {}
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::NotNullViolation | ErrorKind::CheckViolation) => Self::InvalidData,
            _ => Self::Sql(error),
        }
    }
}

/// Convert a stored `BIGINT` into an unsigned domain value.
pub(crate) fn try_get_unsigned<T>(row: &sqlx::postgres::PgRow, col: &str) -> Result<T, Error>
where
    T: TryFrom<i64>,
    T::Error: std::error::Error + Send + Sync + 'static,
{
    use sqlx::Row;

    to_unsigned(row.try_get(col)?, col)
}

/// Convert a `BIGINT` scalar into an unsigned domain value.
pub(crate) fn to_unsigned<T>(value: i64, col: &str) -> Result<T, Error>
where
    T: TryFrom<i64>,
    T::Error: std::error::Error + Send + Sync + 'static,
{
    T::try_from(value).map_err(|e| Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}

/// Convert an unsigned domain value into a `BIGINT` bind parameter.
pub(crate) fn to_bigint<T>(value: T, col: &str) -> Result<i64, Error>
where
    i64: TryFrom<T>,
    <i64 as TryFrom<T>>::Error: std::error::Error + Send + Sync + 'static,
{
    i64::try_from(value).map_err(|e| Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}
