//! `PostgreSQL` order store.

use std::fmt;

use async_trait::async_trait;
use sqlx::{Postgres, Transaction};

use crate::{
    database::Db,
    domain::{
        catalog::records::BicycleUuid,
        inventory::{Reservation, StockLedger, repository::PgStockRepository},
        orders::{
            aggregate::OrderDraft,
            data::{OrderFilter, OrderPage},
            records::{OrderRecord, OrderUuid},
            repository::PgOrdersRepository,
            status::{OrderStatus, PaymentStatus},
            store::{OrderStore, OrderUnitOfWork},
        },
    },
    store::StoreError,
};

#[derive(Debug, Clone)]
pub struct PgOrderStore {
    db: Db,
    orders: PgOrdersRepository,
    stock: PgStockRepository,
}

impl PgOrderStore {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            orders: PgOrdersRepository::new(),
            stock: PgStockRepository::new(),
        }
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn begin(&self) -> Result<Box<dyn OrderUnitOfWork>, StoreError> {
        let tx = self.db.begin_transaction().await?;

        Ok(Box::new(PgOrderUnitOfWork {
            tx,
            orders: self.orders.clone(),
            stock: self.stock.clone(),
        }))
    }

    async fn get_order(&self, order: OrderUuid) -> Result<OrderRecord, StoreError> {
        let mut tx = self.db.begin_transaction().await?;

        let record = self.orders.get_order(&mut tx, order).await?;

        tx.commit().await?;

        Ok(record)
    }

    async fn list_orders(&self, filter: OrderFilter) -> Result<OrderPage, StoreError> {
        let mut tx = self.db.begin_transaction().await?;

        let (orders, total) = self.orders.list_orders(&mut tx, &filter).await?;

        tx.commit().await?;

        Ok(OrderPage {
            orders,
            page: filter.page,
            limit: filter.limit,
            total,
        })
    }
}

/// A unit of work backed by one database transaction.
pub struct PgOrderUnitOfWork {
    tx: Transaction<'static, Postgres>,
    orders: PgOrdersRepository,
    stock: PgStockRepository,
}

impl fmt::Debug for PgOrderUnitOfWork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgOrderUnitOfWork").finish_non_exhaustive()
    }
}

#[async_trait]
impl StockLedger for PgOrderUnitOfWork {
    async fn reserve(
        &mut self,
        bicycle: BicycleUuid,
        quantity: u32,
    ) -> Result<Reservation, StoreError> {
        Ok(self.stock.reserve(&mut self.tx, bicycle, quantity).await?)
    }

    async fn release(&mut self, bicycle: BicycleUuid, quantity: u32) -> Result<u32, StoreError> {
        Ok(self.stock.release(&mut self.tx, bicycle, quantity).await?)
    }
}

#[async_trait]
impl OrderUnitOfWork for PgOrderUnitOfWork {
    async fn insert_order(&mut self, draft: &OrderDraft) -> Result<OrderRecord, StoreError> {
        Ok(self.orders.insert_order(&mut self.tx, draft).await?)
    }

    async fn lock_order(&mut self, order: OrderUuid) -> Result<OrderRecord, StoreError> {
        Ok(self.orders.lock_order(&mut self.tx, order).await?)
    }

    async fn set_status(
        &mut self,
        order: OrderUuid,
        status: OrderStatus,
    ) -> Result<OrderRecord, StoreError> {
        Ok(self.orders.update_status(&mut self.tx, order, status).await?)
    }

    async fn set_payment_status(
        &mut self,
        order: OrderUuid,
        payment_status: PaymentStatus,
    ) -> Result<OrderRecord, StoreError> {
        Ok(self
            .orders
            .update_payment_status(&mut self.tx, order, payment_status)
            .await?)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let Self { tx, .. } = *self;

        Ok(tx.commit().await?)
    }
}
