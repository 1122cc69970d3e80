//! In-memory catalog, customer and order store.
//!
//! Every unit of work holds one async mutex for its whole lifetime and edits a staged copy of
//! the state, so units of work are serialised and an uncommitted one leaves nothing behind.
//! Intended for tests and local experiments.

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    },
};

use async_trait::async_trait;
use jiff::Timestamp;
use rustc_hash::FxHashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::{
    domain::{
        catalog::{
            CatalogService, CatalogServiceError,
            data::NewBicycle,
            records::{BicycleRecord, BicycleUuid},
        },
        customers::{
            CustomersService, CustomersServiceError,
            data::NewCustomer,
            records::{CustomerRecord, CustomerUuid},
        },
        inventory::{Reservation, StockLedger},
        orders::{
            aggregate::OrderDraft,
            data::{OrderFilter, OrderPage},
            records::{OrderRecord, OrderUuid},
            status::{OrderStatus, PaymentStatus},
            store::{OrderStore, OrderUnitOfWork},
        },
    },
    store::StoreError,
};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    bicycles: FxHashMap<BicycleUuid, BicycleRecord>,
    customers: FxHashMap<CustomerUuid, CustomerRecord>,
    orders: FxHashMap<OrderUuid, OrderRecord>,
}

impl MemoryState {
    fn reserve(&mut self, bicycle: BicycleUuid, quantity: u32) -> Reservation {
        let Some(listing) = self.bicycles.get_mut(&bicycle) else {
            return Reservation::Missing;
        };

        match listing.stock_quantity.checked_sub(quantity) {
            Some(remaining) => {
                listing.stock_quantity = remaining;
                listing.updated_at = Timestamp::now();

                Reservation::Reserved { remaining }
            }
            None => Reservation::Insufficient {
                available: listing.stock_quantity,
            },
        }
    }

    fn release(&mut self, bicycle: BicycleUuid, quantity: u32) -> Result<u32, StoreError> {
        let listing = self.bicycles.get_mut(&bicycle).ok_or(StoreError::NotFound)?;

        listing.stock_quantity = listing
            .stock_quantity
            .checked_add(quantity)
            .ok_or(StoreError::InvalidData)?;
        listing.updated_at = Timestamp::now();

        Ok(listing.stock_quantity)
    }

    fn order_mut(&mut self, order: OrderUuid) -> Result<&mut OrderRecord, StoreError> {
        self.orders.get_mut(&order).ok_or(StoreError::NotFound)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
    failing_commits: Arc<AtomicU32>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` unit-of-work commits fail with [`StoreError::Conflict`] and
    /// discard their changes, as a serialization failure would.
    pub fn fail_next_commits(&self, count: u32) {
        self.failing_commits.store(count, Ordering::SeqCst);
    }
}

#[async_trait]
impl CatalogService for MemoryStore {
    async fn get_bicycle(&self, bicycle: BicycleUuid) -> Result<BicycleRecord, CatalogServiceError> {
        self.state
            .lock()
            .await
            .bicycles
            .get(&bicycle)
            .cloned()
            .ok_or(CatalogServiceError::NotFound)
    }

    async fn create_bicycle(
        &self,
        bicycle: NewBicycle,
    ) -> Result<BicycleRecord, CatalogServiceError> {
        if bicycle.model_name.trim().is_empty() {
            return Err(CatalogServiceError::InvalidData);
        }

        let mut state = self.state.lock().await;

        if state.bicycles.contains_key(&bicycle.uuid) {
            return Err(CatalogServiceError::AlreadyExists);
        }

        let now = Timestamp::now();

        let record = BicycleRecord {
            uuid: bicycle.uuid,
            model_name: bicycle.model_name,
            brand: bicycle.brand,
            price: bicycle.price,
            stock_quantity: bicycle.stock_quantity,
            customization_options: bicycle.customization_options,
            description: bicycle.description,
            created_at: now,
            updated_at: now,
        };

        state.bicycles.insert(record.uuid, record.clone());

        Ok(record)
    }

    async fn update_price(
        &self,
        bicycle: BicycleUuid,
        price: u64,
    ) -> Result<BicycleRecord, CatalogServiceError> {
        let mut state = self.state.lock().await;

        let listing = state
            .bicycles
            .get_mut(&bicycle)
            .ok_or(CatalogServiceError::NotFound)?;

        listing.price = price;
        listing.updated_at = Timestamp::now();

        Ok(listing.clone())
    }

    async fn reserve_stock(
        &self,
        bicycle: BicycleUuid,
        quantity: u32,
    ) -> Result<u32, CatalogServiceError> {
        match self.state.lock().await.reserve(bicycle, quantity) {
            Reservation::Reserved { remaining } => Ok(remaining),
            Reservation::Insufficient { available } => {
                Err(CatalogServiceError::InsufficientStock { available })
            }
            Reservation::Missing => Err(CatalogServiceError::NotFound),
        }
    }

    async fn release_stock(
        &self,
        bicycle: BicycleUuid,
        quantity: u32,
    ) -> Result<u32, CatalogServiceError> {
        Ok(self.state.lock().await.release(bicycle, quantity)?)
    }
}

#[async_trait]
impl CustomersService for MemoryStore {
    async fn get_customer(
        &self,
        customer: CustomerUuid,
    ) -> Result<CustomerRecord, CustomersServiceError> {
        self.state
            .lock()
            .await
            .customers
            .get(&customer)
            .cloned()
            .ok_or(CustomersServiceError::NotFound)
    }

    async fn create_customer(
        &self,
        customer: NewCustomer,
    ) -> Result<CustomerRecord, CustomersServiceError> {
        if customer.name.trim().is_empty() {
            return Err(CustomersServiceError::InvalidData);
        }

        let mut state = self.state.lock().await;

        let taken = state.customers.contains_key(&customer.uuid)
            || state.customers.values().any(|c| c.email == customer.email);

        if taken {
            return Err(CustomersServiceError::AlreadyExists);
        }

        let now = Timestamp::now();

        let record = CustomerRecord {
            uuid: customer.uuid,
            name: customer.name,
            email: customer.email,
            loyalty_points: 0,
            created_at: now,
            updated_at: now,
        };

        state.customers.insert(record.uuid, record.clone());

        Ok(record)
    }

    async fn increment_loyalty_points(
        &self,
        customer: CustomerUuid,
        points: u64,
    ) -> Result<u64, CustomersServiceError> {
        let mut state = self.state.lock().await;

        let record = state
            .customers
            .get_mut(&customer)
            .ok_or(CustomersServiceError::NotFound)?;

        record.loyalty_points = record
            .loyalty_points
            .checked_add(points)
            .ok_or(CustomersServiceError::InvalidData)?;
        record.updated_at = Timestamp::now();

        Ok(record.loyalty_points)
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn OrderUnitOfWork>, StoreError> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let staged = guard.clone();

        Ok(Box::new(MemoryUnitOfWork {
            guard,
            staged,
            failing_commits: Arc::clone(&self.failing_commits),
        }))
    }

    async fn get_order(&self, order: OrderUuid) -> Result<OrderRecord, StoreError> {
        self.state
            .lock()
            .await
            .orders
            .get(&order)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn list_orders(&self, filter: OrderFilter) -> Result<OrderPage, StoreError> {
        let state = self.state.lock().await;

        let mut matching: Vec<&OrderRecord> = state
            .orders
            .values()
            .filter(|order| filter.status.is_none_or(|status| order.status == status))
            .filter(|order| {
                filter
                    .customer
                    .is_none_or(|customer| order.customer_uuid == customer)
            })
            .collect();

        matching.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.uuid.cmp(&a.uuid))
        });

        let total = u64::try_from(matching.len()).map_err(|_| StoreError::InvalidData)?;
        let offset = usize::try_from(filter.offset()).map_err(|_| StoreError::InvalidData)?;
        let limit = usize::try_from(filter.limit).map_err(|_| StoreError::InvalidData)?;

        let orders = matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();

        Ok(OrderPage {
            orders,
            page: filter.page,
            limit: filter.limit,
            total,
        })
    }
}

pub struct MemoryUnitOfWork {
    guard: OwnedMutexGuard<MemoryState>,
    staged: MemoryState,
    failing_commits: Arc<AtomicU32>,
}

impl fmt::Debug for MemoryUnitOfWork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryUnitOfWork")
            .field("staged", &self.staged)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl StockLedger for MemoryUnitOfWork {
    async fn reserve(
        &mut self,
        bicycle: BicycleUuid,
        quantity: u32,
    ) -> Result<Reservation, StoreError> {
        Ok(self.staged.reserve(bicycle, quantity))
    }

    async fn release(&mut self, bicycle: BicycleUuid, quantity: u32) -> Result<u32, StoreError> {
        self.staged.release(bicycle, quantity)
    }
}

#[async_trait]
impl OrderUnitOfWork for MemoryUnitOfWork {
    async fn insert_order(&mut self, draft: &OrderDraft) -> Result<OrderRecord, StoreError> {
        if !self.staged.customers.contains_key(&draft.customer_uuid) {
            return Err(StoreError::InvalidReference);
        }

        if self.staged.orders.contains_key(&draft.uuid) {
            return Err(StoreError::AlreadyExists);
        }

        let now = Timestamp::now();

        let record = OrderRecord {
            uuid: draft.uuid,
            customer_uuid: draft.customer_uuid,
            customer_name: draft.customer_name.clone(),
            items: draft.items.clone(),
            delivery_address: draft.delivery_address.clone(),
            payment_method: draft.payment_method.clone(),
            total_amount: draft.total_amount,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        self.staged.orders.insert(record.uuid, record.clone());

        Ok(record)
    }

    async fn lock_order(&mut self, order: OrderUuid) -> Result<OrderRecord, StoreError> {
        self.staged.order_mut(order).cloned()
    }

    async fn set_status(
        &mut self,
        order: OrderUuid,
        status: OrderStatus,
    ) -> Result<OrderRecord, StoreError> {
        let record = self.staged.order_mut(order)?;

        record.status = status;
        record.updated_at = Timestamp::now();

        Ok(record.clone())
    }

    async fn set_payment_status(
        &mut self,
        order: OrderUuid,
        payment_status: PaymentStatus,
    ) -> Result<OrderRecord, StoreError> {
        let record = self.staged.order_mut(order)?;

        record.payment_status = payment_status;
        record.updated_at = Timestamp::now();

        Ok(record.clone())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let Self {
            mut guard,
            staged,
            failing_commits,
        } = *self;

        let injected = failing_commits
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();

        if injected {
            return Err(StoreError::Conflict);
        }

        *guard = staged;

        Ok(())
    }
}
