use clap::Args;
use serde_json::json;
use storefront_app::domain::catalog::{CatalogService, PgCatalogService, records::BicycleUuid};

use crate::config::DatabaseConfig;

#[derive(Debug, Args)]
pub(crate) struct RestockArgs {
    #[command(flatten)]
    database: DatabaseConfig,

    /// Bicycle UUID
    #[arg(long)]
    bicycle: BicycleUuid,

    /// Units to add
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    quantity: u32,
}

pub(crate) async fn run(args: RestockArgs) -> Result<(), String> {
    let db = crate::cli::connect(&args.database).await?;

    let stock_quantity = PgCatalogService::new(db)
        .release_stock(args.bicycle, args.quantity)
        .await
        .map_err(|error| format!("failed to restock: {error}"))?;

    crate::cli::print_json(&json!({
        "bicycle_uuid": args.bicycle,
        "stock_quantity": stock_quantity,
    }))
}
