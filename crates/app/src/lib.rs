//! Storefront order placement and fulfillment: catalog stock, customers, and the order
//! workflow that ties them together.

pub mod context;
pub mod database;
pub mod domain;
pub mod memory;
pub mod retry;
pub mod store;


mod uuids;
