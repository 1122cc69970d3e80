//! Orders Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use rustc_hash::FxHashMap;
use sqlx::{
    FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar,
    types::Json,
};
use uuid::Uuid;

use crate::{
    domain::{
        catalog::records::BicycleUuid,
        customers::records::CustomerUuid,
        orders::{
            aggregate::OrderDraft,
            data::OrderFilter,
            records::{
                DeliveryAddress, OrderItemRecord, OrderRecord, OrderUuid, SelectedCustomization,
            },
            status::{OrderStatus, PaymentStatus},
        },
    },
    store::{to_bigint, to_unsigned, try_get_unsigned},
};

const INSERT_ORDER_SQL: &str = include_str!("sql/insert_order.sql");
const INSERT_ORDER_ITEM_SQL: &str = include_str!("sql/insert_order_item.sql");
const GET_ORDER_SQL: &str = include_str!("sql/get_order.sql");
const LOCK_ORDER_SQL: &str = include_str!("sql/lock_order.sql");
const UPDATE_STATUS_SQL: &str = include_str!("sql/update_status.sql");
const UPDATE_PAYMENT_STATUS_SQL: &str = include_str!("sql/update_payment_status.sql");
const LIST_ORDERS_SQL: &str = include_str!("sql/list_orders.sql");
const COUNT_ORDERS_SQL: &str = include_str!("sql/count_orders.sql");
const LIST_ORDER_ITEMS_SQL: &str = include_str!("sql/list_order_items.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrdersRepository;

impl PgOrdersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    #[tracing::instrument(
        name = "orders.repository.insert_order",
        skip(self, tx, draft),
        fields(order_uuid = %draft.uuid, item_count = draft.items.len()),
        err
    )]
    pub(crate) async fn insert_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        draft: &OrderDraft,
    ) -> Result<OrderRecord, sqlx::Error> {
        let address = &draft.delivery_address;

        let mut order = query_as::<Postgres, OrderRecord>(INSERT_ORDER_SQL)
            .bind(draft.uuid.into_uuid())
            .bind(draft.customer_uuid.into_uuid())
            .bind(&draft.customer_name)
            .bind(to_bigint(draft.total_amount, "total_amount")?)
            .bind(&address.street)
            .bind(&address.city)
            .bind(&address.postal_code)
            .bind(&address.phone)
            .bind(&draft.payment_method)
            .fetch_one(&mut **tx)
            .await?;

        for (position, item) in draft.items.iter().enumerate() {
            let position = i32::try_from(position).map_err(|e| sqlx::Error::ColumnDecode {
                index: "position".to_string(),
                source: Box::new(e),
            })?;

            query(INSERT_ORDER_ITEM_SQL)
                .bind(draft.uuid.into_uuid())
                .bind(position)
                .bind(item.bicycle_uuid.into_uuid())
                .bind(&item.model_name)
                .bind(&item.brand)
                .bind(i64::from(item.quantity))
                .bind(to_bigint(item.price_at_purchase, "price_at_purchase")?)
                .bind(Json(&item.selected_customizations))
                .execute(&mut **tx)
                .await?;
        }

        order.items.clone_from(&draft.items);

        Ok(order)
    }

    pub(crate) async fn get_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<OrderRecord, sqlx::Error> {
        let record = query_as::<Postgres, OrderRecord>(GET_ORDER_SQL)
            .bind(order.into_uuid())
            .fetch_one(&mut **tx)
            .await?;

        self.with_items(tx, record).await
    }

    /// `SELECT … FOR UPDATE`; the row stays locked until the transaction ends.
    pub(crate) async fn lock_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<OrderRecord, sqlx::Error> {
        let record = query_as::<Postgres, OrderRecord>(LOCK_ORDER_SQL)
            .bind(order.into_uuid())
            .fetch_one(&mut **tx)
            .await?;

        self.with_items(tx, record).await
    }

    pub(crate) async fn update_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        status: OrderStatus,
    ) -> Result<OrderRecord, sqlx::Error> {
        let record = query_as::<Postgres, OrderRecord>(UPDATE_STATUS_SQL)
            .bind(order.into_uuid())
            .bind(status.as_str())
            .fetch_one(&mut **tx)
            .await?;

        self.with_items(tx, record).await
    }

    pub(crate) async fn update_payment_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        payment_status: PaymentStatus,
    ) -> Result<OrderRecord, sqlx::Error> {
        let record = query_as::<Postgres, OrderRecord>(UPDATE_PAYMENT_STATUS_SQL)
            .bind(order.into_uuid())
            .bind(payment_status.as_str())
            .fetch_one(&mut **tx)
            .await?;

        self.with_items(tx, record).await
    }

    /// Returns one page of orders and the number of orders matching the filter.
    pub(crate) async fn list_orders(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        filter: &OrderFilter,
    ) -> Result<(Vec<OrderRecord>, u64), sqlx::Error> {
        let status = filter.status.map(OrderStatus::as_str);
        let customer = filter.customer.map(CustomerUuid::into_uuid);

        let total: i64 = query_scalar(COUNT_ORDERS_SQL)
            .bind(status)
            .bind(customer)
            .fetch_one(&mut **tx)
            .await?;

        let mut orders = query_as::<Postgres, OrderRecord>(LIST_ORDERS_SQL)
            .bind(status)
            .bind(customer)
            .bind(i64::from(filter.limit))
            .bind(to_bigint(filter.offset(), "offset")?)
            .fetch_all(&mut **tx)
            .await?;

        let uuids: Vec<Uuid> = orders.iter().map(|order| order.uuid.into_uuid()).collect();
        let mut items = self.list_items(tx, &uuids).await?;

        for order in &mut orders {
            order.items = items.remove(&order.uuid).unwrap_or_default();
        }

        Ok((orders, to_unsigned(total, "count")?))
    }

    async fn with_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        mut order: OrderRecord,
    ) -> Result<OrderRecord, sqlx::Error> {
        let mut items = self.list_items(tx, &[order.uuid.into_uuid()]).await?;

        order.items = items.remove(&order.uuid).unwrap_or_default();

        Ok(order)
    }

    async fn list_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        orders: &[Uuid],
    ) -> Result<FxHashMap<OrderUuid, Vec<OrderItemRecord>>, sqlx::Error> {
        let rows = query_as::<Postgres, OrderItemRow>(LIST_ORDER_ITEMS_SQL)
            .bind(orders)
            .fetch_all(&mut **tx)
            .await?;

        let mut items: FxHashMap<OrderUuid, Vec<OrderItemRecord>> = FxHashMap::default();

        for row in rows {
            items.entry(row.order_uuid).or_default().push(row.item);
        }

        Ok(items)
    }
}

struct OrderItemRow {
    order_uuid: OrderUuid,
    item: OrderItemRecord,
}

impl<'r> FromRow<'r, PgRow> for OrderItemRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let Json(selected_customizations) =
            row.try_get::<Json<Vec<SelectedCustomization>>, _>("selected_customizations")?;

        Ok(Self {
            order_uuid: OrderUuid::from_uuid(row.try_get("order_uuid")?),
            item: OrderItemRecord {
                bicycle_uuid: BicycleUuid::from_uuid(row.try_get("bicycle_uuid")?),
                model_name: row.try_get("model_name")?,
                brand: row.try_get("brand")?,
                quantity: try_get_unsigned(row, "quantity")?,
                price_at_purchase: try_get_unsigned(row, "price_at_purchase")?,
                selected_customizations,
            },
        })
    }
}

/// Decodes the order header. Items live in their own table and are attached afterwards.
impl<'r> FromRow<'r, PgRow> for OrderRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let status = row
            .try_get::<String, _>("status")?
            .parse::<OrderStatus>()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "status".to_string(),
                source: Box::new(e),
            })?;

        let payment_status = row
            .try_get::<String, _>("payment_status")?
            .parse::<PaymentStatus>()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "payment_status".to_string(),
                source: Box::new(e),
            })?;

        Ok(Self {
            uuid: OrderUuid::from_uuid(row.try_get("uuid")?),
            customer_uuid: CustomerUuid::from_uuid(row.try_get("customer_uuid")?),
            customer_name: row.try_get("customer_name")?,
            items: Vec::new(),
            delivery_address: DeliveryAddress {
                street: row.try_get("delivery_street")?,
                city: row.try_get("delivery_city")?,
                postal_code: row.try_get("delivery_postal_code")?,
                phone: row.try_get("delivery_phone")?,
            },
            payment_method: row.try_get("payment_method")?,
            total_amount: try_get_unsigned(row, "total_amount")?,
            status,
            payment_status,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
