//! Catalog service.

use async_trait::async_trait;
use mockall::automock;
use tracing::info;

use crate::{
    database::Db,
    domain::{
        catalog::{
            data::NewBicycle,
            errors::CatalogServiceError,
            records::{BicycleRecord, BicycleUuid},
            repository::PgCatalogRepository,
        },
        inventory::{Reservation, repository::PgStockRepository},
    },
};

#[derive(Debug, Clone)]
pub struct PgCatalogService {
    db: Db,
    repository: PgCatalogRepository,
    stock: PgStockRepository,
}

impl PgCatalogService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgCatalogRepository::new(),
            stock: PgStockRepository::new(),
        }
    }
}

#[async_trait]
impl CatalogService for PgCatalogService {
    async fn get_bicycle(&self, bicycle: BicycleUuid) -> Result<BicycleRecord, CatalogServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let record = self.repository.get_bicycle(&mut tx, bicycle).await?;

        tx.commit().await?;

        Ok(record)
    }

    #[tracing::instrument(
        name = "catalog.service.create_bicycle",
        skip(self, bicycle),
        fields(bicycle_uuid = %bicycle.uuid),
        err
    )]
    async fn create_bicycle(
        &self,
        bicycle: NewBicycle,
    ) -> Result<BicycleRecord, CatalogServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let record = self.repository.create_bicycle(&mut tx, &bicycle).await?;

        tx.commit().await?;

        info!(bicycle_uuid = %record.uuid, model_name = %record.model_name, "created bicycle");

        Ok(record)
    }

    #[tracing::instrument(
        name = "catalog.service.update_price",
        skip(self),
        fields(bicycle_uuid = %bicycle),
        err
    )]
    async fn update_price(
        &self,
        bicycle: BicycleUuid,
        price: u64,
    ) -> Result<BicycleRecord, CatalogServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let record = self.repository.update_price(&mut tx, bicycle, price).await?;

        tx.commit().await?;

        info!(bicycle_uuid = %bicycle, price, "updated bicycle price");

        Ok(record)
    }

    #[tracing::instrument(
        name = "catalog.service.reserve_stock",
        skip(self),
        fields(bicycle_uuid = %bicycle),
        err
    )]
    async fn reserve_stock(
        &self,
        bicycle: BicycleUuid,
        quantity: u32,
    ) -> Result<u32, CatalogServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let reservation = self.stock.reserve(&mut tx, bicycle, quantity).await?;

        match reservation {
            Reservation::Reserved { remaining } => {
                tx.commit().await?;

                Ok(remaining)
            }
            Reservation::Insufficient { available } => {
                Err(CatalogServiceError::InsufficientStock { available })
            }
            Reservation::Missing => Err(CatalogServiceError::NotFound),
        }
    }

    #[tracing::instrument(
        name = "catalog.service.release_stock",
        skip(self),
        fields(bicycle_uuid = %bicycle),
        err
    )]
    async fn release_stock(
        &self,
        bicycle: BicycleUuid,
        quantity: u32,
    ) -> Result<u32, CatalogServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let stock = self.stock.release(&mut tx, bicycle, quantity).await?;

        tx.commit().await?;

        info!(bicycle_uuid = %bicycle, quantity, stock, "released stock");

        Ok(stock)
    }
}

#[automock]
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Retrieve a single bicycle listing.
    async fn get_bicycle(&self, bicycle: BicycleUuid) -> Result<BicycleRecord, CatalogServiceError>;

    /// Creates a new bicycle listing.
    async fn create_bicycle(&self, bicycle: NewBicycle)
    -> Result<BicycleRecord, CatalogServiceError>;

    /// Changes the listed price. Existing orders keep the price they were placed at.
    async fn update_price(
        &self,
        bicycle: BicycleUuid,
        price: u64,
    ) -> Result<BicycleRecord, CatalogServiceError>;

    /// Takes `quantity` units out of stock if they are available, returning what remains.
    async fn reserve_stock(
        &self,
        bicycle: BicycleUuid,
        quantity: u32,
    ) -> Result<u32, CatalogServiceError>;

    /// Puts `quantity` units back into stock, returning the new stock level.
    async fn release_stock(
        &self,
        bicycle: BicycleUuid,
        quantity: u32,
    ) -> Result<u32, CatalogServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::test::{TestContext, helpers::road_bike};

    use super::*;

    #[tokio::test]
    async fn create_bicycle_round_trips_customizations() -> TestResult {
        let ctx = TestContext::new().await;
        let bicycle = road_bike(5);

        let created = ctx.catalog.create_bicycle(bicycle.clone()).await?;
        let fetched = ctx.catalog.get_bicycle(bicycle.uuid).await?;

        assert_eq!(created.uuid, bicycle.uuid);
        assert_eq!(fetched.price, 450_000);
        assert_eq!(fetched.stock_quantity, 5);
        assert_eq!(fetched.customization_options, bicycle.customization_options);

        Ok(())
    }

    #[tokio::test]
    async fn create_bicycle_duplicate_uuid_returns_already_exists() -> TestResult {
        let ctx = TestContext::new().await;
        let bicycle = road_bike(1);

        ctx.catalog.create_bicycle(bicycle.clone()).await?;

        let result = ctx.catalog.create_bicycle(bicycle).await;

        assert!(
            matches!(result, Err(CatalogServiceError::AlreadyExists)),
            "expected AlreadyExists, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn get_bicycle_unknown_uuid_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.catalog.get_bicycle(BicycleUuid::new()).await;

        assert!(
            matches!(result, Err(CatalogServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn reserve_stock_never_goes_negative() -> TestResult {
        let ctx = TestContext::new().await;
        let bicycle = ctx.catalog.create_bicycle(road_bike(3)).await?;

        assert_eq!(ctx.catalog.reserve_stock(bicycle.uuid, 2).await?, 1);

        let result = ctx.catalog.reserve_stock(bicycle.uuid, 2).await;

        assert!(
            matches!(
                result,
                Err(CatalogServiceError::InsufficientStock { available: 1 })
            ),
            "expected InsufficientStock, got {result:?}"
        );
        assert_eq!(ctx.catalog.get_bicycle(bicycle.uuid).await?.stock_quantity, 1);

        Ok(())
    }

    #[tokio::test]
    async fn release_stock_increments_counter() -> TestResult {
        let ctx = TestContext::new().await;
        let bicycle = ctx.catalog.create_bicycle(road_bike(0)).await?;

        assert_eq!(ctx.catalog.release_stock(bicycle.uuid, 4).await?, 4);

        let result = ctx.catalog.release_stock(BicycleUuid::new(), 1).await;

        assert!(
            matches!(result, Err(CatalogServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn update_price_changes_listing() -> TestResult {
        let ctx = TestContext::new().await;
        let bicycle = ctx.catalog.create_bicycle(road_bike(1)).await?;

        let updated = ctx.catalog.update_price(bicycle.uuid, 999_000).await?;

        assert_eq!(updated.price, 999_000);

        Ok(())
    }
}
