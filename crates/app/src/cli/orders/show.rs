use clap::Args;
use storefront_app::{context::AppContext, domain::orders::records::OrderUuid};

#[derive(Debug, Args)]
pub(crate) struct ShowOrderArgs {
    /// Order UUID
    #[arg(long)]
    order: OrderUuid,
}

pub(crate) async fn run(app: &AppContext, args: ShowOrderArgs) -> Result<(), String> {
    let order = app
        .orders
        .get_order(args.order)
        .await
        .map_err(|error| format!("failed to load order: {error}"))?;

    crate::cli::print_json(&order)
}
