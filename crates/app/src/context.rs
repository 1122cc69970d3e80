//! App Context

use std::{fmt, sync::Arc};

use sqlx::PgPool;
use thiserror::Error;

use crate::{
    database::{self, Db, PoolSettings},
    domain::{
        catalog::{CatalogService, PgCatalogService},
        customers::{CustomersService, PgCustomersService},
        orders::{OrderWorkflow, OrdersService, PgOrderStore, WorkflowSettings},
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),
}

/// The services an operator or transport layer talks to.
#[derive(Clone)]
pub struct AppContext {
    pub catalog: Arc<dyn CatalogService>,
    pub customers: Arc<dyn CustomersService>,
    pub orders: Arc<dyn OrdersService>,
}

impl fmt::Debug for AppContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppContext").finish_non_exhaustive()
    }
}

impl AppContext {
    /// Build application context from a database URL.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection fails.
    pub async fn from_database_url(
        url: &str,
        pool: &PoolSettings,
        settings: WorkflowSettings,
    ) -> Result<Self, AppInitError> {
        let pool = database::connect_with(url, pool)
            .await
            .map_err(AppInitError::Database)?;

        Ok(Self::from_pool(pool, settings))
    }

    /// Wire the `PostgreSQL` services over an existing pool.
    #[must_use]
    pub fn from_pool(pool: PgPool, settings: WorkflowSettings) -> Self {
        let db = Db::new(pool);

        let catalog = Arc::new(PgCatalogService::new(db.clone()));
        let customers = Arc::new(PgCustomersService::new(db.clone()));

        let orders = OrderWorkflow::new(
            catalog.clone(),
            customers.clone(),
            Arc::new(PgOrderStore::new(db)),
            settings,
        );

        Self {
            catalog,
            customers,
            orders: Arc::new(orders),
        }
    }
}
