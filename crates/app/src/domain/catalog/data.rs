//! Catalog Data

use crate::domain::catalog::records::{BicycleUuid, CustomizationOption};

/// New Bicycle Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBicycle {
    pub uuid: BicycleUuid,
    pub model_name: String,
    pub brand: String,
    pub price: u64,
    pub stock_quantity: u32,
    pub customization_options: Vec<CustomizationOption>,
    pub description: String,
}
