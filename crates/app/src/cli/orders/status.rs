use clap::Args;
use storefront_app::{context::AppContext, domain::orders::records::OrderUuid};

#[derive(Debug, Args)]
pub(crate) struct UpdateStatusArgs {
    /// Order UUID
    #[arg(long)]
    order: OrderUuid,

    /// New status (pending, confirmed, shipped, delivered, cancelled)
    #[arg(long)]
    status: String,
}

pub(crate) async fn run(app: &AppContext, args: UpdateStatusArgs) -> Result<(), String> {
    let order = app
        .orders
        .update_order_status(args.order, &args.status)
        .await
        .map_err(|error| format!("failed to update order status: {error}"))?;

    crate::cli::print_json(&order)
}
