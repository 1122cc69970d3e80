//! Stock Repository

use sqlx::{Postgres, Transaction, query_scalar};

use crate::{
    domain::{catalog::records::BicycleUuid, inventory::ledger::Reservation},
    store::to_unsigned,
};

const RESERVE_STOCK_SQL: &str = include_str!("sql/reserve_stock.sql");
const RELEASE_STOCK_SQL: &str = include_str!("sql/release_stock.sql");
const GET_STOCK_SQL: &str = include_str!("sql/get_stock.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgStockRepository;

impl PgStockRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Conditionally decrement the stock counter. The follow-up read only runs when nothing
    /// was reserved and is used to describe the failure.
    #[tracing::instrument(
        name = "inventory.repository.reserve",
        skip(self, tx),
        fields(bicycle_uuid = %bicycle, quantity),
        err
    )]
    pub(crate) async fn reserve(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        bicycle: BicycleUuid,
        quantity: u32,
    ) -> Result<Reservation, sqlx::Error> {
        let remaining: Option<i64> = query_scalar(RESERVE_STOCK_SQL)
            .bind(bicycle.into_uuid())
            .bind(i64::from(quantity))
            .fetch_optional(&mut **tx)
            .await?;

        if let Some(remaining) = remaining {
            return Ok(Reservation::Reserved {
                remaining: to_unsigned(remaining, "stock_quantity")?,
            });
        }

        let available: Option<i64> = query_scalar(GET_STOCK_SQL)
            .bind(bicycle.into_uuid())
            .fetch_optional(&mut **tx)
            .await?;

        match available {
            Some(available) => Ok(Reservation::Insufficient {
                available: to_unsigned(available, "stock_quantity")?,
            }),
            None => Ok(Reservation::Missing),
        }
    }

    #[tracing::instrument(
        name = "inventory.repository.release",
        skip(self, tx),
        fields(bicycle_uuid = %bicycle, quantity),
        err
    )]
    pub(crate) async fn release(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        bicycle: BicycleUuid,
        quantity: u32,
    ) -> Result<u32, sqlx::Error> {
        let stock: i64 = query_scalar(RELEASE_STOCK_SQL)
            .bind(bicycle.into_uuid())
            .bind(i64::from(quantity))
            .fetch_one(&mut **tx)
            .await?;

        to_unsigned(stock, "stock_quantity")
    }
}
