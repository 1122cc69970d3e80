//! Customers Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as, query_scalar};

use crate::{
    domain::customers::{
        data::NewCustomer,
        records::{CustomerRecord, CustomerUuid},
    },
    store::{to_bigint, to_unsigned, try_get_unsigned},
};

const GET_CUSTOMER_SQL: &str = include_str!("sql/get_customer.sql");
const CREATE_CUSTOMER_SQL: &str = include_str!("sql/create_customer.sql");
const INCREMENT_LOYALTY_POINTS_SQL: &str = include_str!("sql/increment_loyalty_points.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCustomersRepository;

impl PgCustomersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn get_customer(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        customer: CustomerUuid,
    ) -> Result<CustomerRecord, sqlx::Error> {
        query_as::<Postgres, CustomerRecord>(GET_CUSTOMER_SQL)
            .bind(customer.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn create_customer(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        customer: &NewCustomer,
    ) -> Result<CustomerRecord, sqlx::Error> {
        query_as::<Postgres, CustomerRecord>(CREATE_CUSTOMER_SQL)
            .bind(customer.uuid.into_uuid())
            .bind(&customer.name)
            .bind(&customer.email)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn increment_loyalty_points(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        customer: CustomerUuid,
        points: u64,
    ) -> Result<u64, sqlx::Error> {
        let balance: i64 = query_scalar(INCREMENT_LOYALTY_POINTS_SQL)
            .bind(customer.into_uuid())
            .bind(to_bigint(points, "loyalty_points")?)
            .fetch_one(&mut **tx)
            .await?;

        to_unsigned(balance, "loyalty_points")
    }
}

impl<'r> FromRow<'r, PgRow> for CustomerRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: CustomerUuid::from_uuid(row.try_get("uuid")?),
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            loyalty_points: try_get_unsigned(row, "loyalty_points")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
