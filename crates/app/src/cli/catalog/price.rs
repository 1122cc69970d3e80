use clap::Args;
use storefront_app::domain::catalog::{CatalogService, PgCatalogService, records::BicycleUuid};

use crate::config::DatabaseConfig;

#[derive(Debug, Args)]
pub(crate) struct UpdatePriceArgs {
    #[command(flatten)]
    database: DatabaseConfig,

    /// Bicycle UUID
    #[arg(long)]
    bicycle: BicycleUuid,

    /// New price in minor currency units
    #[arg(long)]
    price: u64,
}

pub(crate) async fn run(args: UpdatePriceArgs) -> Result<(), String> {
    let db = crate::cli::connect(&args.database).await?;

    let bicycle = PgCatalogService::new(db)
        .update_price(args.bicycle, args.price)
        .await
        .map_err(|error| format!("failed to update price: {error}"))?;

    crate::cli::print_json(&bicycle)
}
