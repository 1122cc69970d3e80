//! Catalog service errors.

use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum CatalogServiceError {
    #[error("bicycle not found")]
    NotFound,

    #[error("bicycle already exists")]
    AlreadyExists,

    #[error("invalid data")]
    InvalidData,

    #[error("insufficient stock: {available} available")]
    InsufficientStock { available: u32 },

    #[error(transparent)]
    Store(StoreError),
}

impl CatalogServiceError {
    /// Collapse into a storage error for callers that only distinguish missing listings.
    #[must_use]
    pub fn into_store_error(self) -> StoreError {
        match self {
            Self::NotFound => StoreError::NotFound,
            Self::AlreadyExists => StoreError::AlreadyExists,
            Self::InvalidData | Self::InsufficientStock { .. } => StoreError::InvalidData,
            Self::Store(error) => error,
        }
    }
}

impl From<StoreError> for CatalogServiceError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound => Self::NotFound,
            StoreError::AlreadyExists => Self::AlreadyExists,
            StoreError::InvalidData | StoreError::InvalidReference => Self::InvalidData,
            other => Self::Store(other),
        }
    }
}

impl From<sqlx::Error> for CatalogServiceError {
    fn from(error: sqlx::Error) -> Self {
        StoreError::from(error).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_is_a_missing_bicycle() {
        let error = CatalogServiceError::from(sqlx::Error::RowNotFound);

        assert!(
            matches!(error, CatalogServiceError::NotFound),
            "expected NotFound, got {error:?}"
        );
    }

    #[test]
    fn transient_store_errors_are_kept() {
        let error = CatalogServiceError::from(StoreError::Conflict);

        assert!(error.into_store_error().is_transient());
    }
}
