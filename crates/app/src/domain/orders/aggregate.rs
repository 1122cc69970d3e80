//! Order Aggregate
//!
//! Request validation, price snapshots and total derivation. Nothing here touches storage.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::domain::{
    catalog::records::{BicycleRecord, BicycleUuid},
    customers::records::{CustomerRecord, CustomerUuid},
    inventory::StockLine,
    orders::{
        data::{NewOrderItem, PlaceOrder},
        records::{DeliveryAddress, OrderItemRecord, OrderUuid},
    },
};

/// Largest amount, in minor units, that a price, line or order total may reach. Amounts are
/// stored as `BIGINT`.
pub const MAX_AMOUNT: u64 = i64::MAX.unsigned_abs();

/// Whether selected customizations must match the listing's option catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CustomizationPolicy {
    #[default]
    Unchecked,
    Validated,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderValidationError {
    #[error("order must contain at least one item")]
    EmptyOrder,

    #[error("quantity for bicycle {0} must be at least 1")]
    ZeroQuantity(BicycleUuid),

    #[error("delivery address requires a street and city")]
    MissingDeliveryAddress,

    #[error("payment method is required")]
    MissingPaymentMethod,

    #[error("order total exceeds the largest storable amount")]
    TotalOverflow,

    #[error("bicycle {bicycle} does not offer {name} = {value}")]
    UnknownCustomization {
        bicycle: BicycleUuid,
        name: String,
        value: String,
    },
}

/// Checks a checkout request before anything is looked up.
///
/// # Errors
///
/// Returns the first problem found.
pub fn validate_request(request: &PlaceOrder) -> Result<(), OrderValidationError> {
    if request.items.is_empty() {
        return Err(OrderValidationError::EmptyOrder);
    }

    if let Some(item) = request.items.iter().find(|item| item.quantity == 0) {
        return Err(OrderValidationError::ZeroQuantity(item.bicycle_uuid));
    }

    let address = &request.delivery_address;

    if address.street.trim().is_empty() || address.city.trim().is_empty() {
        return Err(OrderValidationError::MissingDeliveryAddress);
    }

    if request.payment_method.trim().is_empty() {
        return Err(OrderValidationError::MissingPaymentMethod);
    }

    Ok(())
}

/// Total quantity requested per bicycle, in first-seen order.
#[must_use]
pub fn requested_quantities(items: &[NewOrderItem]) -> Vec<(BicycleUuid, u32)> {
    let mut totals: Vec<(BicycleUuid, u32)> = Vec::new();

    for item in items {
        match totals.iter_mut().find(|(uuid, _)| *uuid == item.bicycle_uuid) {
            Some((_, quantity)) => *quantity = quantity.saturating_add(item.quantity),
            None => totals.push((item.bicycle_uuid, item.quantity)),
        }
    }

    totals
}

/// Copy the listing's current name, brand and price into a new order line.
///
/// # Errors
///
/// Under [`CustomizationPolicy::Validated`], fails when a selection is not offered.
pub fn snapshot_item(
    item: NewOrderItem,
    listing: &BicycleRecord,
    policy: CustomizationPolicy,
) -> Result<OrderItemRecord, OrderValidationError> {
    if policy == CustomizationPolicy::Validated
        && let Some(unknown) = item
            .selected_customizations
            .iter()
            .find(|selected| !listing.offers(&selected.name, &selected.value))
    {
        return Err(OrderValidationError::UnknownCustomization {
            bicycle: listing.uuid,
            name: unknown.name.clone(),
            value: unknown.value.clone(),
        });
    }

    Ok(OrderItemRecord {
        bicycle_uuid: listing.uuid,
        model_name: listing.model_name.clone(),
        brand: listing.brand.clone(),
        quantity: item.quantity,
        price_at_purchase: listing.price,
        selected_customizations: item.selected_customizations,
    })
}

/// Sum of every line total.
///
/// # Errors
///
/// Returns [`OrderValidationError::TotalOverflow`] if a line or the sum exceeds [`MAX_AMOUNT`].
pub fn order_total(items: &[OrderItemRecord]) -> Result<u64, OrderValidationError> {
    items.iter().try_fold(0_u64, |total, item| {
        item.line_total()
            .and_then(|line| total.checked_add(line))
            .filter(|sum| *sum <= MAX_AMOUNT)
            .ok_or(OrderValidationError::TotalOverflow)
    })
}

/// An order that has been validated and priced but not yet stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    pub uuid: OrderUuid,
    pub customer_uuid: CustomerUuid,
    pub customer_name: String,
    pub items: Vec<OrderItemRecord>,
    pub delivery_address: DeliveryAddress,
    pub payment_method: String,
    pub total_amount: u64,
}

impl OrderDraft {
    /// # Errors
    ///
    /// Fails for an empty item list or an overflowing total.
    pub fn new(
        customer: &CustomerRecord,
        items: Vec<OrderItemRecord>,
        delivery_address: DeliveryAddress,
        payment_method: String,
    ) -> Result<Self, OrderValidationError> {
        if items.is_empty() {
            return Err(OrderValidationError::EmptyOrder);
        }

        let total_amount = order_total(&items)?;

        Ok(Self {
            uuid: OrderUuid::new(),
            customer_uuid: customer.uuid,
            customer_name: customer.name.clone(),
            items,
            delivery_address,
            payment_method,
            total_amount,
        })
    }

    /// One ledger line per bicycle with the quantities of its order lines summed, sorted by
    /// bicycle so concurrent checkouts lock stock rows in the same order.
    #[must_use]
    pub fn stock_lines(&self) -> Vec<StockLine> {
        let mut quantities: BTreeMap<BicycleUuid, u32> = BTreeMap::new();

        for item in &self.items {
            let quantity = quantities.entry(item.bicycle_uuid).or_default();

            *quantity = quantity.saturating_add(item.quantity);
        }

        quantities
            .into_iter()
            .map(|(bicycle, quantity)| StockLine { bicycle, quantity })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use testresult::TestResult;

    use crate::domain::{
        catalog::records::CustomizationOption, orders::records::SelectedCustomization,
    };

    use super::*;

    fn listing(model_name: &str, price: u64) -> BicycleRecord {
        BicycleRecord {
            uuid: BicycleUuid::new(),
            model_name: model_name.to_string(),
            brand: "Cannondale".to_string(),
            price,
            stock_quantity: 10,
            customization_options: vec![CustomizationOption {
                name: "size".to_string(),
                options: vec!["54".to_string(), "56".to_string()],
            }],
            description: String::new(),
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
        }
    }

    fn customer() -> CustomerRecord {
        CustomerRecord {
            uuid: CustomerUuid::new(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            loyalty_points: 0,
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
        }
    }

    fn address() -> DeliveryAddress {
        DeliveryAddress {
            street: "1 Canal St".to_string(),
            city: "Utrecht".to_string(),
            postal_code: "3511".to_string(),
            phone: "+31 30 000 0000".to_string(),
        }
    }

    fn item(bicycle_uuid: BicycleUuid, quantity: u32) -> NewOrderItem {
        NewOrderItem {
            bicycle_uuid,
            quantity,
            selected_customizations: Vec::new(),
        }
    }

    fn request(items: Vec<NewOrderItem>) -> PlaceOrder {
        PlaceOrder {
            customer_uuid: CustomerUuid::new(),
            items,
            delivery_address: address(),
            payment_method: "card".to_string(),
            displayed_total: None,
        }
    }

    #[test]
    fn empty_order_is_rejected() {
        assert_eq!(
            validate_request(&request(Vec::new())),
            Err(OrderValidationError::EmptyOrder)
        );
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let bicycle = BicycleUuid::new();

        assert_eq!(
            validate_request(&request(vec![item(BicycleUuid::new(), 1), item(bicycle, 0)])),
            Err(OrderValidationError::ZeroQuantity(bicycle))
        );
    }

    #[test]
    fn blank_street_is_rejected() {
        let mut request = request(vec![item(BicycleUuid::new(), 1)]);
        request.delivery_address.street = "   ".to_string();

        assert_eq!(
            validate_request(&request),
            Err(OrderValidationError::MissingDeliveryAddress)
        );
    }

    #[test]
    fn blank_payment_method_is_rejected() {
        let mut request = request(vec![item(BicycleUuid::new(), 1)]);
        request.payment_method = String::new();

        assert_eq!(
            validate_request(&request),
            Err(OrderValidationError::MissingPaymentMethod)
        );
    }

    #[test]
    fn quantities_are_summed_per_bicycle() {
        let road = BicycleUuid::new();
        let gravel = BicycleUuid::new();

        let totals = requested_quantities(&[item(road, 2), item(gravel, 1), item(road, 3)]);

        assert_eq!(totals, vec![(road, 5), (gravel, 1)]);
    }

    #[test]
    fn total_is_sum_of_line_totals() -> TestResult {
        let road = listing("Synapse", 450_000);
        let gravel = listing("Topstone", 620_000);

        let items = vec![
            snapshot_item(item(road.uuid, 1), &road, CustomizationPolicy::Unchecked)?,
            snapshot_item(item(gravel.uuid, 1), &gravel, CustomizationPolicy::Unchecked)?,
        ];

        assert_eq!(order_total(&items)?, 1_070_000);

        Ok(())
    }

    #[test]
    fn quantity_multiplies_unit_price() -> TestResult {
        let road = listing("Synapse", 1_999);

        let items = vec![snapshot_item(
            item(road.uuid, 3),
            &road,
            CustomizationPolicy::Unchecked,
        )?];

        assert_eq!(order_total(&items)?, 5_997);

        Ok(())
    }

    #[test]
    fn overflowing_total_is_rejected() -> TestResult {
        let road = listing("Synapse", u64::MAX / 2 + 1);

        let items = vec![snapshot_item(
            item(road.uuid, 2),
            &road,
            CustomizationPolicy::Unchecked,
        )?];

        assert_eq!(order_total(&items), Err(OrderValidationError::TotalOverflow));

        Ok(())
    }

    #[test]
    fn totals_beyond_the_storable_range_are_rejected() -> TestResult {
        let road = listing("Synapse", MAX_AMOUNT);

        let single = vec![snapshot_item(
            item(road.uuid, 1),
            &road,
            CustomizationPolicy::Unchecked,
        )?];

        assert_eq!(order_total(&single)?, MAX_AMOUNT);

        let doubled = vec![snapshot_item(
            item(road.uuid, 2),
            &road,
            CustomizationPolicy::Unchecked,
        )?];

        assert_eq!(order_total(&doubled), Err(OrderValidationError::TotalOverflow));

        let split = [single.as_slice(), single.as_slice()].concat();

        assert_eq!(order_total(&split), Err(OrderValidationError::TotalOverflow));

        let result = OrderDraft::new(&customer(), doubled, address(), "card".to_string());

        assert_eq!(result, Err(OrderValidationError::TotalOverflow));

        Ok(())
    }

    #[test]
    fn stock_lines_merge_repeated_bicycles_in_uuid_order() -> TestResult {
        let first = listing("Synapse", 1);
        let second = listing("Topstone", 1);

        let (low, high) = if first.uuid < second.uuid {
            (first, second)
        } else {
            (second, first)
        };

        let items = vec![
            snapshot_item(item(high.uuid, 1), &high, CustomizationPolicy::Unchecked)?,
            snapshot_item(item(low.uuid, 4), &low, CustomizationPolicy::Unchecked)?,
            snapshot_item(item(high.uuid, 2), &high, CustomizationPolicy::Unchecked)?,
        ];

        let draft = OrderDraft::new(&customer(), items, address(), "card".to_string())?;

        assert_eq!(
            draft.stock_lines(),
            vec![
                StockLine {
                    bicycle: low.uuid,
                    quantity: 4,
                },
                StockLine {
                    bicycle: high.uuid,
                    quantity: 3,
                },
            ]
        );

        Ok(())
    }

    #[test]
    fn snapshot_copies_listing_fields() -> TestResult {
        let road = listing("Synapse", 450_000);

        let snapshot = snapshot_item(item(road.uuid, 2), &road, CustomizationPolicy::Unchecked)?;

        assert_eq!(snapshot.model_name, "Synapse");
        assert_eq!(snapshot.brand, "Cannondale");
        assert_eq!(snapshot.price_at_purchase, 450_000);
        assert_eq!(snapshot.quantity, 2);

        Ok(())
    }

    #[test]
    fn unchecked_policy_accepts_any_customization() -> TestResult {
        let road = listing("Synapse", 1);
        let mut new_item = item(road.uuid, 1);
        new_item.selected_customizations.push(SelectedCustomization {
            name: "color".to_string(),
            value: "gold".to_string(),
        });

        let snapshot = snapshot_item(new_item, &road, CustomizationPolicy::Unchecked)?;

        assert_eq!(snapshot.selected_customizations.len(), 1);

        Ok(())
    }

    #[test]
    fn validated_policy_rejects_unknown_customization() {
        let road = listing("Synapse", 1);
        let mut new_item = item(road.uuid, 1);
        new_item.selected_customizations.push(SelectedCustomization {
            name: "size".to_string(),
            value: "62".to_string(),
        });

        let result = snapshot_item(new_item, &road, CustomizationPolicy::Validated);

        assert!(
            matches!(
                result,
                Err(OrderValidationError::UnknownCustomization { ref value, .. }) if value == "62"
            ),
            "expected UnknownCustomization, got {result:?}"
        );
    }

    #[test]
    fn validated_policy_accepts_offered_customization() {
        let road = listing("Synapse", 1);
        let mut new_item = item(road.uuid, 1);
        new_item.selected_customizations.push(SelectedCustomization {
            name: "size".to_string(),
            value: "56".to_string(),
        });

        assert!(snapshot_item(new_item, &road, CustomizationPolicy::Validated).is_ok());
    }

    #[test]
    fn draft_carries_customer_snapshot_and_stock_lines() -> TestResult {
        let road = listing("Synapse", 100);
        let customer = customer();

        let items = vec![snapshot_item(
            item(road.uuid, 4),
            &road,
            CustomizationPolicy::Unchecked,
        )?];

        let draft = OrderDraft::new(&customer, items, address(), "card".to_string())?;

        assert_eq!(draft.customer_name, "Ada");
        assert_eq!(draft.total_amount, 400);
        assert_eq!(
            draft.stock_lines(),
            vec![StockLine {
                bicycle: road.uuid,
                quantity: 4
            }]
        );

        Ok(())
    }
}
