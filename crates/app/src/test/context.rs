//! Test context for service-level integration tests.

use std::sync::Arc;

use crate::{
    database::Db,
    domain::{
        catalog::PgCatalogService,
        customers::PgCustomersService,
        orders::{OrderWorkflow, PgOrderStore, WorkflowSettings},
    },
};

use super::db::TestDb;

pub struct TestContext {
    pub db: TestDb,
    pub catalog: PgCatalogService,
    pub customers: PgCustomersService,
    pub orders: OrderWorkflow,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_settings(super::helpers::fast_settings()).await
    }

    pub async fn with_settings(settings: WorkflowSettings) -> Self {
        let test_db = TestDb::new().await;
        let db = Db::new(test_db.pool().clone());

        let catalog = PgCatalogService::new(db.clone());
        let customers = PgCustomersService::new(db.clone());

        let orders = OrderWorkflow::new(
            Arc::new(catalog.clone()),
            Arc::new(customers.clone()),
            Arc::new(PgOrderStore::new(db)),
            settings,
        );

        Self {
            db: test_db,
            catalog,
            customers,
            orders,
        }
    }
}
