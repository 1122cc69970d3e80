//! Order Records

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::{
    domain::{
        catalog::records::BicycleUuid,
        customers::records::CustomerUuid,
        orders::status::{OrderStatus, PaymentStatus},
    },
    uuids::TypedUuid,
};

/// Order UUID
pub type OrderUuid = TypedUuid<OrderRecord>;

/// A customization picked by the buyer, e.g. `color = red`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedCustomization {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryAddress {
    pub street: String,
    pub city: String,
    pub postal_code: String,
    pub phone: String,
}

/// Order Item Record
///
/// Model name, brand and price are copied from the listing when the order is placed and are
/// never read from the catalog again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderItemRecord {
    pub bicycle_uuid: BicycleUuid,
    pub model_name: String,
    pub brand: String,
    pub quantity: u32,
    pub price_at_purchase: u64,
    pub selected_customizations: Vec<SelectedCustomization>,
}

impl OrderItemRecord {
    /// `price_at_purchase * quantity`, or `None` on overflow.
    #[must_use]
    pub fn line_total(&self) -> Option<u64> {
        self.price_at_purchase.checked_mul(u64::from(self.quantity))
    }
}

/// Order Record
#[derive(Debug, Clone, Serialize)]
pub struct OrderRecord {
    pub uuid: OrderUuid,
    pub customer_uuid: CustomerUuid,
    pub customer_name: String,
    pub items: Vec<OrderItemRecord>,
    pub delivery_address: DeliveryAddress,
    pub payment_method: String,
    pub total_amount: u64,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
