//! Order persistence seams.

use async_trait::async_trait;

use crate::{
    domain::{
        inventory::StockLedger,
        orders::{
            aggregate::OrderDraft,
            data::{OrderFilter, OrderPage},
            records::{OrderRecord, OrderUuid},
            status::{OrderStatus, PaymentStatus},
        },
    },
    store::StoreError,
};

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Start a unit of work. Dropping it without [`OrderUnitOfWork::commit`] discards every
    /// change made through it, stock reservations included.
    async fn begin(&self) -> Result<Box<dyn OrderUnitOfWork>, StoreError>;

    async fn get_order(&self, order: OrderUuid) -> Result<OrderRecord, StoreError>;

    /// Newest first. `filter` is expected to be normalized.
    async fn list_orders(&self, filter: OrderFilter) -> Result<OrderPage, StoreError>;
}

/// Order mutations and stock movements that commit or abort together.
#[async_trait]
pub trait OrderUnitOfWork: StockLedger {
    /// Insert the order and its items as `pending`/`pending`.
    async fn insert_order(&mut self, draft: &OrderDraft) -> Result<OrderRecord, StoreError>;

    /// Read the order and hold it against concurrent modification until the unit of work ends.
    async fn lock_order(&mut self, order: OrderUuid) -> Result<OrderRecord, StoreError>;

    async fn set_status(
        &mut self,
        order: OrderUuid,
        status: OrderStatus,
    ) -> Result<OrderRecord, StoreError>;

    async fn set_payment_status(
        &mut self,
        order: OrderUuid,
        payment_status: PaymentStatus,
    ) -> Result<OrderRecord, StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}
