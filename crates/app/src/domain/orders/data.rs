//! Orders Data

use serde::Serialize;

use crate::domain::{
    catalog::records::BicycleUuid,
    customers::records::CustomerUuid,
    orders::{
        records::{DeliveryAddress, OrderRecord, SelectedCustomization},
        status::OrderStatus,
    },
};

/// Default number of orders per page.
pub const DEFAULT_PAGE_LIMIT: u32 = 10;

/// Largest accepted page size.
pub const MAX_PAGE_LIMIT: u32 = 100;

/// New Order Item Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderItem {
    pub bicycle_uuid: BicycleUuid,
    pub quantity: u32,
    pub selected_customizations: Vec<SelectedCustomization>,
}

/// A checkout request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceOrder {
    pub customer_uuid: CustomerUuid,
    pub items: Vec<NewOrderItem>,
    pub delivery_address: DeliveryAddress,
    pub payment_method: String,

    /// Total shown to the buyer. Only compared against the computed total for logging.
    pub displayed_total: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub customer: Option<CustomerUuid>,

    /// 1-based page number.
    pub page: u32,

    pub limit: u32,
}

impl Default for OrderFilter {
    fn default() -> Self {
        Self {
            status: None,
            customer: None,
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl OrderFilter {
    /// Clamp the page to at least 1 and the limit to `1..=MAX_PAGE_LIMIT`.
    #[must_use]
    pub fn normalized(self) -> Self {
        let limit = if self.limit == 0 {
            DEFAULT_PAGE_LIMIT
        } else {
            self.limit.min(MAX_PAGE_LIMIT)
        };

        Self {
            page: self.page.max(1),
            limit,
            ..self
        }
    }

    /// Number of rows to skip.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderPage {
    pub orders: Vec<OrderRecord>,
    pub page: u32,
    pub limit: u32,
    pub total: u64,
}

impl OrderPage {
    #[must_use]
    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(u64::from(self.limit.max(1)))
    }
}
