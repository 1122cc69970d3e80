//! Test Helpers

use std::{sync::Arc, time::Duration};

use crate::{
    domain::{
        catalog::{
            data::NewBicycle,
            records::{BicycleUuid, CustomizationOption},
        },
        customers::{data::NewCustomer, records::CustomerUuid},
        orders::{
            OrderWorkflow, WorkflowSettings,
            data::{NewOrderItem, PlaceOrder},
            records::DeliveryAddress,
        },
    },
    memory::MemoryStore,
    retry::RetryPolicy,
};

pub(crate) fn road_bike(stock_quantity: u32) -> NewBicycle {
    NewBicycle {
        uuid: BicycleUuid::new(),
        model_name: "Allez Sprint".to_string(),
        brand: "Specialized".to_string(),
        price: 450_000,
        stock_quantity,
        customization_options: vec![CustomizationOption {
            name: "color".to_string(),
            options: vec!["red".to_string(), "black".to_string()],
        }],
        description: "Aluminium race frame".to_string(),
    }
}

pub(crate) fn gravel_bike(stock_quantity: u32) -> NewBicycle {
    NewBicycle {
        uuid: BicycleUuid::new(),
        model_name: "Topstone Carbon".to_string(),
        brand: "Cannondale".to_string(),
        price: 620_000,
        stock_quantity,
        customization_options: Vec::new(),
        description: String::new(),
    }
}

pub(crate) fn new_customer(handle: &str) -> NewCustomer {
    NewCustomer {
        uuid: CustomerUuid::new(),
        name: handle.to_string(),
        email: format!("{handle}@example.com"),
    }
}

pub(crate) fn delivery_address() -> DeliveryAddress {
    DeliveryAddress {
        street: "12 Spoke Lane".to_string(),
        city: "Leiden".to_string(),
        postal_code: "2311".to_string(),
        phone: "+31 71 000 0000".to_string(),
    }
}

pub(crate) fn place_order(customer: CustomerUuid, lines: &[(BicycleUuid, u32)]) -> PlaceOrder {
    PlaceOrder {
        customer_uuid: customer,
        items: lines
            .iter()
            .map(|&(bicycle_uuid, quantity)| NewOrderItem {
                bicycle_uuid,
                quantity,
                selected_customizations: Vec::new(),
            })
            .collect(),
        delivery_address: delivery_address(),
        payment_method: "card".to_string(),
        displayed_total: None,
    }
}

/// Default settings without backoff sleeps.
pub(crate) fn fast_settings() -> WorkflowSettings {
    WorkflowSettings {
        retry: RetryPolicy {
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            ..RetryPolicy::default()
        },
        ..WorkflowSettings::default()
    }
}

/// A workflow where every collaborator is the same in-memory store.
pub(crate) fn memory_workflow(settings: WorkflowSettings) -> (MemoryStore, OrderWorkflow) {
    let store = MemoryStore::new();

    let workflow = OrderWorkflow::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        settings,
    );

    (store, workflow)
}
