//! Inventory

pub mod ledger;
pub(crate) mod repository;

pub use ledger::*;
