use clap::Args;
use storefront_app::{
    context::AppContext,
    domain::{
        customers::records::CustomerUuid,
        orders::{
            data::{NewOrderItem, PlaceOrder},
            records::{DeliveryAddress, SelectedCustomization},
        },
    },
};

#[derive(Debug, Args)]
pub(crate) struct PlaceOrderArgs {
    /// Customer UUID
    #[arg(long)]
    customer: CustomerUuid,

    /// Line item as `BICYCLE_UUID:QUANTITY[:name=value,...]`; repeatable
    #[arg(long = "item", required = true, value_parser = parse_item)]
    items: Vec<NewOrderItem>,

    /// Delivery street
    #[arg(long)]
    street: String,

    /// Delivery city
    #[arg(long)]
    city: String,

    /// Delivery postal code
    #[arg(long)]
    postal_code: String,

    /// Contact phone number
    #[arg(long)]
    phone: String,

    /// Payment method label, e.g. `card`
    #[arg(long)]
    payment_method: String,

    /// Total shown to the buyer, in minor units; only checked for drift
    #[arg(long)]
    displayed_total: Option<u64>,
}

fn parse_item(raw: &str) -> Result<NewOrderItem, String> {
    let mut parts = raw.splitn(3, ':');

    let bicycle_uuid = parts
        .next()
        .unwrap_or_default()
        .parse()
        .map_err(|error| format!("invalid bicycle uuid in `{raw}`: {error}"))?;

    let quantity = parts
        .next()
        .ok_or_else(|| format!("missing quantity in `{raw}`"))?
        .parse()
        .map_err(|error| format!("invalid quantity in `{raw}`: {error}"))?;

    let selected_customizations = match parts.next() {
        None => Vec::new(),
        Some(choices) => choices
            .split(',')
            .map(|choice| {
                choice
                    .split_once('=')
                    .map(|(name, value)| SelectedCustomization {
                        name: name.trim().to_string(),
                        value: value.trim().to_string(),
                    })
                    .ok_or_else(|| format!("expected name=value, got `{choice}`"))
            })
            .collect::<Result<_, _>>()?,
    };

    Ok(NewOrderItem {
        bicycle_uuid,
        quantity,
        selected_customizations,
    })
}

pub(crate) async fn run(app: &AppContext, args: PlaceOrderArgs) -> Result<(), String> {
    let placed = app
        .orders
        .create_order(PlaceOrder {
            customer_uuid: args.customer,
            items: args.items,
            delivery_address: DeliveryAddress {
                street: args.street,
                city: args.city,
                postal_code: args.postal_code,
                phone: args.phone,
            },
            payment_method: args.payment_method,
            displayed_total: args.displayed_total,
        })
        .await
        .map_err(|error| format!("failed to place order: {error}"))?;

    crate::cli::print_json(&placed)
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    const BICYCLE: &str = "01890a5d-ac96-774b-bcce-b302099a8057";

    #[test]
    fn parses_uuid_and_quantity() -> TestResult {
        let item = parse_item(&format!("{BICYCLE}:2"))?;

        assert_eq!(item.bicycle_uuid.to_string(), BICYCLE);
        assert_eq!(item.quantity, 2);
        assert!(item.selected_customizations.is_empty(), "no customizations given");

        Ok(())
    }

    #[test]
    fn parses_customizations() -> TestResult {
        let item = parse_item(&format!("{BICYCLE}:1:color=red, size = 56"))?;

        assert_eq!(
            item.selected_customizations,
            vec![
                SelectedCustomization {
                    name: "color".to_string(),
                    value: "red".to_string(),
                },
                SelectedCustomization {
                    name: "size".to_string(),
                    value: "56".to_string(),
                },
            ]
        );

        Ok(())
    }

    #[test]
    fn rejects_malformed_items() {
        assert!(parse_item(BICYCLE).is_err());
        assert!(parse_item("not-a-uuid:1").is_err());
        assert!(parse_item(&format!("{BICYCLE}:-1")).is_err());
        assert!(parse_item(&format!("{BICYCLE}:1:color")).is_err());
    }
}
