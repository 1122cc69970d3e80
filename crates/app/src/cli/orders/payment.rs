use clap::Args;
use storefront_app::{context::AppContext, domain::orders::records::OrderUuid};

#[derive(Debug, Args)]
pub(crate) struct UpdatePaymentArgs {
    /// Order UUID
    #[arg(long)]
    order: OrderUuid,

    /// New payment status (pending, paid, refunded)
    #[arg(long)]
    status: String,
}

pub(crate) async fn run(app: &AppContext, args: UpdatePaymentArgs) -> Result<(), String> {
    let order = app
        .orders
        .update_payment_status(args.order, &args.status)
        .await
        .map_err(|error| format!("failed to update payment status: {error}"))?;

    crate::cli::print_json(&order)
}
