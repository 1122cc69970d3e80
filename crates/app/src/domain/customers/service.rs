//! Customers service.

use async_trait::async_trait;
use mockall::automock;
use tracing::info;

use crate::{
    database::Db,
    domain::customers::{
        data::NewCustomer,
        errors::CustomersServiceError,
        records::{CustomerRecord, CustomerUuid},
        repository::PgCustomersRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgCustomersService {
    db: Db,
    repository: PgCustomersRepository,
}

impl PgCustomersService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgCustomersRepository::new(),
        }
    }
}

#[async_trait]
impl CustomersService for PgCustomersService {
    async fn get_customer(
        &self,
        customer: CustomerUuid,
    ) -> Result<CustomerRecord, CustomersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let record = self.repository.get_customer(&mut tx, customer).await?;

        tx.commit().await?;

        Ok(record)
    }

    #[tracing::instrument(
        name = "customers.service.create_customer",
        skip(self, customer),
        fields(customer_uuid = %customer.uuid),
        err
    )]
    async fn create_customer(
        &self,
        customer: NewCustomer,
    ) -> Result<CustomerRecord, CustomersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let record = self.repository.create_customer(&mut tx, &customer).await?;

        tx.commit().await?;

        info!(customer_uuid = %record.uuid, "created customer");

        Ok(record)
    }

    #[tracing::instrument(
        name = "customers.service.increment_loyalty_points",
        skip(self),
        fields(customer_uuid = %customer),
        err
    )]
    async fn increment_loyalty_points(
        &self,
        customer: CustomerUuid,
        points: u64,
    ) -> Result<u64, CustomersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let balance = self
            .repository
            .increment_loyalty_points(&mut tx, customer, points)
            .await?;

        tx.commit().await?;

        Ok(balance)
    }
}

#[automock]
#[async_trait]
pub trait CustomersService: Send + Sync {
    /// Retrieve a single customer.
    async fn get_customer(
        &self,
        customer: CustomerUuid,
    ) -> Result<CustomerRecord, CustomersServiceError>;

    /// Creates a new customer. Emails are unique.
    async fn create_customer(
        &self,
        customer: NewCustomer,
    ) -> Result<CustomerRecord, CustomersServiceError>;

    /// Atomically adds `points` to the loyalty balance, returning the new balance.
    async fn increment_loyalty_points(
        &self,
        customer: CustomerUuid,
        points: u64,
    ) -> Result<u64, CustomersServiceError>;
}
