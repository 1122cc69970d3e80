//! Orders service errors.

use thiserror::Error;

use crate::{
    domain::{
        catalog::records::BicycleUuid,
        orders::{
            aggregate::OrderValidationError,
            status::{OrderStatus, UnknownStatus},
        },
    },
    retry::Transient,
    store::StoreError,
};

#[derive(Debug, Error)]
pub enum OrdersServiceError {
    #[error("customer not found")]
    CustomerNotFound,

    #[error("bicycle not found: {0}")]
    ItemNotFound(BicycleUuid),

    #[error("insufficient stock for {model_name}: {requested} requested, {available} available")]
    InsufficientStock {
        bicycle: BicycleUuid,
        model_name: String,
        requested: u32,
        available: u32,
    },

    #[error("order not found")]
    NotFound,

    #[error("invalid order status: {0}")]
    InvalidStatus(String),

    #[error("cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error(transparent)]
    Validation(#[from] OrderValidationError),

    #[error("transaction aborted after {attempts} attempt(s)")]
    TransactionAborted {
        attempts: u32,
        #[source]
        source: StoreError,
    },

    #[error(transparent)]
    Storage(StoreError),
}

impl OrdersServiceError {
    /// Whether the caller sent something the workflow refuses, as opposed to a server failure.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::TransactionAborted { .. } | Self::Storage(_))
    }
}

impl Transient for OrdersServiceError {
    fn is_transient(&self) -> bool {
        matches!(self, Self::Storage(error) if error.is_transient())
    }
}

impl From<StoreError> for OrdersServiceError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound => Self::NotFound,
            other => Self::Storage(other),
        }
    }
}

impl From<UnknownStatus> for OrdersServiceError {
    fn from(error: UnknownStatus) -> Self {
        Self::InvalidStatus(error.0)
    }
}
