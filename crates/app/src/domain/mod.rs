//! Storefront Domain Concerns

pub mod catalog;
pub mod customers;
pub mod inventory;
pub mod orders;
