//! Catalog Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as, types::Json};

use crate::{
    domain::catalog::{
        data::NewBicycle,
        records::{BicycleRecord, BicycleUuid, CustomizationOption},
    },
    store::{to_bigint, try_get_unsigned},
};

const GET_BICYCLE_SQL: &str = include_str!("sql/get_bicycle.sql");
const CREATE_BICYCLE_SQL: &str = include_str!("sql/create_bicycle.sql");
const UPDATE_PRICE_SQL: &str = include_str!("sql/update_price.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCatalogRepository;

impl PgCatalogRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn get_bicycle(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        bicycle: BicycleUuid,
    ) -> Result<BicycleRecord, sqlx::Error> {
        query_as::<Postgres, BicycleRecord>(GET_BICYCLE_SQL)
            .bind(bicycle.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn create_bicycle(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        bicycle: &NewBicycle,
    ) -> Result<BicycleRecord, sqlx::Error> {
        query_as::<Postgres, BicycleRecord>(CREATE_BICYCLE_SQL)
            .bind(bicycle.uuid.into_uuid())
            .bind(&bicycle.model_name)
            .bind(&bicycle.brand)
            .bind(to_bigint(bicycle.price, "price")?)
            .bind(i64::from(bicycle.stock_quantity))
            .bind(Json(&bicycle.customization_options))
            .bind(&bicycle.description)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_price(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        bicycle: BicycleUuid,
        price: u64,
    ) -> Result<BicycleRecord, sqlx::Error> {
        query_as::<Postgres, BicycleRecord>(UPDATE_PRICE_SQL)
            .bind(bicycle.into_uuid())
            .bind(to_bigint(price, "price")?)
            .fetch_one(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for BicycleRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let Json(customization_options) =
            row.try_get::<Json<Vec<CustomizationOption>>, _>("customization_options")?;

        Ok(Self {
            uuid: BicycleUuid::from_uuid(row.try_get("uuid")?),
            model_name: row.try_get("model_name")?,
            brand: row.try_get("brand")?,
            price: try_get_unsigned(row, "price")?,
            stock_quantity: try_get_unsigned(row, "stock_quantity")?,
            customization_options,
            description: row.try_get("description")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
