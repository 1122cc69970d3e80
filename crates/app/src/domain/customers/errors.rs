//! Customers service errors.

use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum CustomersServiceError {
    #[error("customer not found")]
    NotFound,

    #[error("customer already exists")]
    AlreadyExists,

    #[error("invalid data")]
    InvalidData,

    #[error(transparent)]
    Store(StoreError),
}

impl CustomersServiceError {
    #[must_use]
    pub fn into_store_error(self) -> StoreError {
        match self {
            Self::NotFound => StoreError::NotFound,
            Self::AlreadyExists => StoreError::AlreadyExists,
            Self::InvalidData => StoreError::InvalidData,
            Self::Store(error) => error,
        }
    }
}

impl From<StoreError> for CustomersServiceError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound => Self::NotFound,
            StoreError::AlreadyExists => Self::AlreadyExists,
            StoreError::InvalidData | StoreError::InvalidReference => Self::InvalidData,
            other => Self::Store(other),
        }
    }
}

impl From<sqlx::Error> for CustomersServiceError {
    fn from(error: sqlx::Error) -> Self {
        StoreError::from(error).into()
    }
}
