use clap::Args;
use storefront_app::domain::catalog::{
    CatalogService, PgCatalogService,
    data::NewBicycle,
    records::{BicycleUuid, CustomizationOption},
};

use crate::config::DatabaseConfig;

#[derive(Debug, Args)]
pub(crate) struct AddBicycleArgs {
    #[command(flatten)]
    database: DatabaseConfig,

    /// Model name
    #[arg(long)]
    model_name: String,

    /// Brand
    #[arg(long)]
    brand: String,

    /// Price in minor currency units
    #[arg(long)]
    price: u64,

    /// Units in stock
    #[arg(long, default_value_t = 0)]
    stock: u32,

    /// Free-form description
    #[arg(long, default_value = "")]
    description: String,

    /// Customization option as `name=value|value|...`; repeatable
    #[arg(long = "option", value_parser = parse_option)]
    options: Vec<CustomizationOption>,

    /// Optional bicycle UUID; generated when omitted
    #[arg(long)]
    bicycle_uuid: Option<BicycleUuid>,
}

fn parse_option(raw: &str) -> Result<CustomizationOption, String> {
    let (name, values) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value|value, got `{raw}`"))?;

    let name = name.trim();

    let options: Vec<String> = values
        .split('|')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect();

    if name.is_empty() || options.is_empty() {
        return Err(format!("option `{raw}` needs a name and at least one value"));
    }

    Ok(CustomizationOption {
        name: name.to_string(),
        options,
    })
}

pub(crate) async fn run(args: AddBicycleArgs) -> Result<(), String> {
    let db = crate::cli::connect(&args.database).await?;

    let service = PgCatalogService::new(db);

    let bicycle = service
        .create_bicycle(NewBicycle {
            uuid: args.bicycle_uuid.unwrap_or_default(),
            model_name: args.model_name,
            brand: args.brand,
            price: args.price,
            stock_quantity: args.stock,
            customization_options: args.options,
            description: args.description,
        })
        .await
        .map_err(|error| format!("failed to add bicycle: {error}"))?;

    crate::cli::print_json(&bicycle)
}
