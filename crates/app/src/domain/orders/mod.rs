//! Orders

pub mod aggregate;
pub mod data;
pub mod errors;
pub mod loyalty;
pub mod pg;
pub mod records;
mod repository;
pub mod service;
pub mod status;
pub mod store;

pub use errors::OrdersServiceError;
pub use pg::PgOrderStore;
pub use service::*;
pub use store::{OrderStore, OrderUnitOfWork};
