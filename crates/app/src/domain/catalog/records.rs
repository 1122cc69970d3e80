//! Catalog Records

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::uuids::TypedUuid;

/// Bicycle UUID
pub type BicycleUuid = TypedUuid<BicycleRecord>;

/// A named customization and the values a buyer may pick from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomizationOption {
    pub name: String,
    pub options: Vec<String>,
}

/// Bicycle Record
#[derive(Debug, Clone, Serialize)]
pub struct BicycleRecord {
    pub uuid: BicycleUuid,
    pub model_name: String,
    pub brand: String,

    /// Unit price in minor currency units.
    pub price: u64,

    pub stock_quantity: u32,
    pub customization_options: Vec<CustomizationOption>,
    pub description: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl BicycleRecord {
    /// Whether `value` is one of the listed choices for the customization `name`.
    #[must_use]
    pub fn offers(&self, name: &str, value: &str) -> bool {
        self.customization_options
            .iter()
            .any(|option| option.name == name && option.options.iter().any(|o| o == value))
    }
}
