//! Order workflow.

use std::{fmt, future::Future, sync::Arc, time::Duration};

use async_trait::async_trait;
use mockall::automock;
use rustc_hash::FxHashMap;
use serde::Serialize;
use tokio::time::timeout;
use tracing::{Span, debug, info, warn};

use crate::{
    domain::{
        catalog::{
            CatalogService, CatalogServiceError,
            records::{BicycleRecord, BicycleUuid},
        },
        customers::{CustomersService, CustomersServiceError, records::CustomerRecord},
        inventory::{BatchReservationError, reserve_all},
        orders::{
            aggregate::{
                CustomizationPolicy, OrderDraft, requested_quantities, snapshot_item,
                validate_request,
            },
            data::{NewOrderItem, OrderFilter, OrderPage, PlaceOrder},
            errors::OrdersServiceError,
            loyalty::{LoyaltyAccrual, LoyaltyPolicy},
            records::{OrderRecord, OrderUuid},
            status::{OrderStatus, PaymentStatus, TransitionPolicy},
            store::OrderStore,
        },
    },
    retry::{Exhausted, RetryPolicy},
    store::StoreError,
};

/// Knobs for the order workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowSettings {
    pub retry: RetryPolicy,
    pub loyalty: LoyaltyPolicy,
    pub transitions: TransitionPolicy,
    pub customizations: CustomizationPolicy,

    /// Upper bound for a single unit of work attempt.
    pub transaction_timeout: Duration,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            loyalty: LoyaltyPolicy::default(),
            transitions: TransitionPolicy::default(),
            customizations: CustomizationPolicy::default(),
            transaction_timeout: Duration::from_secs(5),
        }
    }
}

/// A stored order and what happened to the buyer's loyalty balance.
#[derive(Debug, Clone, Serialize)]
pub struct PlacedOrder {
    pub order: OrderRecord,
    pub loyalty: LoyaltyAccrual,
}

#[derive(Clone)]
pub struct OrderWorkflow {
    catalog: Arc<dyn CatalogService>,
    customers: Arc<dyn CustomersService>,
    orders: Arc<dyn OrderStore>,
    settings: WorkflowSettings,
}

impl fmt::Debug for OrderWorkflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderWorkflow")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl OrderWorkflow {
    #[must_use]
    pub fn new(
        catalog: Arc<dyn CatalogService>,
        customers: Arc<dyn CustomersService>,
        orders: Arc<dyn OrderStore>,
        settings: WorkflowSettings,
    ) -> Self {
        Self {
            catalog,
            customers,
            orders,
            settings,
        }
    }

    async fn resolve_customer(
        &self,
        request: &PlaceOrder,
    ) -> Result<CustomerRecord, OrdersServiceError> {
        self.customers
            .get_customer(request.customer_uuid)
            .await
            .map_err(|error| match error {
                CustomersServiceError::NotFound => OrdersServiceError::CustomerNotFound,
                other => OrdersServiceError::Storage(other.into_store_error()),
            })
    }

    async fn resolve_listings(
        &self,
        items: &[NewOrderItem],
    ) -> Result<FxHashMap<BicycleUuid, BicycleRecord>, OrdersServiceError> {
        let mut listings = FxHashMap::default();

        for (bicycle, requested) in requested_quantities(items) {
            let listing = self
                .catalog
                .get_bicycle(bicycle)
                .await
                .map_err(|error| match error {
                    CatalogServiceError::NotFound => OrdersServiceError::ItemNotFound(bicycle),
                    other => OrdersServiceError::Storage(other.into_store_error()),
                })?;

            if listing.stock_quantity < requested {
                return Err(OrdersServiceError::InsufficientStock {
                    bicycle,
                    model_name: listing.model_name,
                    requested,
                    available: listing.stock_quantity,
                });
            }

            listings.insert(bicycle, listing);
        }

        Ok(listings)
    }

    /// Run one unit of work attempt under the configured timeout.
    async fn bounded<T>(
        &self,
        work: impl Future<Output = Result<T, OrdersServiceError>>,
    ) -> Result<T, OrdersServiceError> {
        match timeout(self.settings.transaction_timeout, work).await {
            Ok(result) => result,
            Err(_elapsed) => {
                warn!(
                    timeout_ms = u64::try_from(self.settings.transaction_timeout.as_millis())
                        .unwrap_or(u64::MAX),
                    "unit of work timed out"
                );

                Err(OrdersServiceError::Storage(StoreError::Timeout))
            }
        }
    }

    /// Retry transient storage failures, then give up with `TransactionAborted`.
    async fn with_retry<T, F, Fut>(&self, operation: F) -> Result<T, OrdersServiceError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, OrdersServiceError>>,
    {
        self.settings
            .retry
            .run(operation)
            .await
            .map_err(|Exhausted { attempts, error }| match error {
                OrdersServiceError::Storage(source) if source.is_transient() => {
                    OrdersServiceError::TransactionAborted { attempts, source }
                }
                other => other,
            })
    }

    /// Insert the order and reserve its stock, all or nothing.
    async fn commit_order(&self, draft: &OrderDraft) -> Result<OrderRecord, OrdersServiceError> {
        let mut unit = self.orders.begin().await?;

        let order = unit
            .insert_order(draft)
            .await
            .map_err(|error| match error {
                StoreError::InvalidReference => OrdersServiceError::CustomerNotFound,
                other => OrdersServiceError::Storage(other),
            })?;

        match reserve_all(&mut *unit, &draft.stock_lines()).await {
            Ok(()) => {}
            Err(BatchReservationError::Shortfall {
                bicycle,
                requested,
                available,
            }) => {
                let model_name = draft
                    .items
                    .iter()
                    .find(|item| item.bicycle_uuid == bicycle)
                    .map(|item| item.model_name.clone())
                    .unwrap_or_default();

                return Err(OrdersServiceError::InsufficientStock {
                    bicycle,
                    model_name,
                    requested,
                    available,
                });
            }
            Err(BatchReservationError::Missing(bicycle)) => {
                return Err(OrdersServiceError::ItemNotFound(bicycle));
            }
            Err(BatchReservationError::Store(error)) => {
                return Err(OrdersServiceError::Storage(error));
            }
        }

        unit.commit().await.map_err(OrdersServiceError::Storage)?;

        Ok(order)
    }

    async fn apply_status(
        &self,
        order: OrderUuid,
        status: OrderStatus,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut unit = self.orders.begin().await?;

        let current = unit.lock_order(order).await?;

        if current.status == OrderStatus::Cancelled && status == OrderStatus::Cancelled {
            return match self.settings.transitions {
                TransitionPolicy::Unrestricted => Ok(current),
                TransitionPolicy::Enforced => Err(OrdersServiceError::InvalidTransition {
                    from: current.status,
                    to: status,
                }),
            };
        }

        if !self.settings.transitions.permits(current.status, status) {
            return Err(OrdersServiceError::InvalidTransition {
                from: current.status,
                to: status,
            });
        }

        if status == OrderStatus::Cancelled {
            for item in &current.items {
                let stock = unit
                    .release(item.bicycle_uuid, item.quantity)
                    .await
                    .map_err(|error| match error {
                        StoreError::NotFound => {
                            OrdersServiceError::ItemNotFound(item.bicycle_uuid)
                        }
                        other => OrdersServiceError::Storage(other),
                    })?;

                debug!(
                    bicycle_uuid = %item.bicycle_uuid,
                    quantity = item.quantity,
                    stock,
                    "released stock"
                );
            }
        }

        let updated = unit.set_status(order, status).await?;

        unit.commit().await.map_err(OrdersServiceError::Storage)?;

        Ok(updated)
    }

    async fn apply_payment_status(
        &self,
        order: OrderUuid,
        payment_status: PaymentStatus,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut unit = self.orders.begin().await?;

        unit.lock_order(order).await?;

        let updated = unit.set_payment_status(order, payment_status).await?;

        unit.commit().await.map_err(OrdersServiceError::Storage)?;

        Ok(updated)
    }

    /// Credit loyalty points for a committed order. Never fails the order.
    async fn accrue_loyalty(&self, order: &OrderRecord) -> LoyaltyAccrual {
        let points = self.settings.loyalty.points_for(order.total_amount);

        if points == 0 {
            return LoyaltyAccrual::NotEligible;
        }

        match self
            .customers
            .increment_loyalty_points(order.customer_uuid, points)
            .await
        {
            Ok(balance) => {
                info!(
                    order_uuid = %order.uuid,
                    customer_uuid = %order.customer_uuid,
                    points,
                    balance,
                    "credited loyalty points"
                );

                LoyaltyAccrual::Credited { points, balance }
            }
            Err(error) => {
                warn!(
                    order_uuid = %order.uuid,
                    customer_uuid = %order.customer_uuid,
                    points,
                    "failed to credit loyalty points: {error}"
                );

                LoyaltyAccrual::Failed {
                    points,
                    reason: error.to_string(),
                }
            }
        }
    }
}

#[async_trait]
impl OrdersService for OrderWorkflow {
    #[tracing::instrument(
        name = "orders.service.create_order",
        skip(self, request),
        fields(
            customer_uuid = %request.customer_uuid,
            item_count = request.items.len(),
            order_uuid = tracing::field::Empty,
            total_amount = tracing::field::Empty
        ),
        err
    )]
    async fn create_order(&self, request: PlaceOrder) -> Result<PlacedOrder, OrdersServiceError> {
        validate_request(&request)?;

        let customer = self.resolve_customer(&request).await?;
        let listings = self.resolve_listings(&request.items).await?;

        let PlaceOrder {
            items,
            delivery_address,
            payment_method,
            displayed_total,
            ..
        } = request;

        let mut snapshots = Vec::with_capacity(items.len());

        for item in items {
            let bicycle = item.bicycle_uuid;
            let listing = listings
                .get(&bicycle)
                .ok_or(OrdersServiceError::ItemNotFound(bicycle))?;

            snapshots.push(snapshot_item(item, listing, self.settings.customizations)?);
        }

        let draft = OrderDraft::new(&customer, snapshots, delivery_address, payment_method)?;

        if let Some(displayed) = displayed_total
            && displayed != draft.total_amount
        {
            warn!(
                displayed_total = displayed,
                total_amount = draft.total_amount,
                "displayed total differs from computed total, storing computed total"
            );
        }

        let span = Span::current();

        span.record("order_uuid", tracing::field::display(draft.uuid));
        span.record("total_amount", draft.total_amount);

        let draft = &draft;

        let order = self
            .with_retry(move |_| self.bounded(self.commit_order(draft)))
            .await?;

        info!(
            order_uuid = %order.uuid,
            total_amount = order.total_amount,
            "created order"
        );

        let loyalty = self.accrue_loyalty(&order).await;

        Ok(PlacedOrder { order, loyalty })
    }

    #[tracing::instrument(
        name = "orders.service.update_order_status",
        skip(self),
        fields(order_uuid = %order),
        err
    )]
    async fn update_order_status(
        &self,
        order: OrderUuid,
        status: &str,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let status: OrderStatus = status.parse()?;

        let updated = self
            .with_retry(move |_| self.bounded(self.apply_status(order, status)))
            .await?;

        info!(order_uuid = %order, status = %updated.status, "updated order status");

        Ok(updated)
    }

    #[tracing::instrument(
        name = "orders.service.update_payment_status",
        skip(self),
        fields(order_uuid = %order),
        err
    )]
    async fn update_payment_status(
        &self,
        order: OrderUuid,
        payment_status: &str,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let payment_status: PaymentStatus = payment_status.parse()?;

        let updated = self
            .with_retry(move |_| self.bounded(self.apply_payment_status(order, payment_status)))
            .await?;

        info!(
            order_uuid = %order,
            payment_status = %updated.payment_status,
            "updated payment status"
        );

        Ok(updated)
    }

    async fn get_order(&self, order: OrderUuid) -> Result<OrderRecord, OrdersServiceError> {
        Ok(self.orders.get_order(order).await?)
    }

    async fn list_orders(&self, filter: OrderFilter) -> Result<OrderPage, OrdersServiceError> {
        Ok(self.orders.list_orders(filter.normalized()).await?)
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Validates, prices and stores a new order, reserving its stock atomically.
    async fn create_order(&self, request: PlaceOrder) -> Result<PlacedOrder, OrdersServiceError>;

    /// Moves an order to a new status. Cancelling puts the ordered stock back.
    async fn update_order_status(
        &self,
        order: OrderUuid,
        status: &str,
    ) -> Result<OrderRecord, OrdersServiceError>;

    /// Sets the payment status (`pending`, `paid` or `refunded`).
    async fn update_payment_status(
        &self,
        order: OrderUuid,
        payment_status: &str,
    ) -> Result<OrderRecord, OrdersServiceError>;

    /// Retrieve a single order.
    async fn get_order(&self, order: OrderUuid) -> Result<OrderRecord, OrdersServiceError>;

    /// Retrieve a page of orders, newest first.
    async fn list_orders(&self, filter: OrderFilter) -> Result<OrderPage, OrdersServiceError>;
}
