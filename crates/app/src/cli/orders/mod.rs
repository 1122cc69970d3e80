use clap::{Args, Subcommand};
use storefront_app::context::AppContext;

use crate::config::{DatabaseConfig, WorkflowConfig};

mod list;
mod payment;
mod place;
mod show;
mod status;

#[derive(Debug, Args)]
pub(crate) struct OrdersCommand {
    #[command(flatten)]
    database: DatabaseConfig,

    #[command(flatten)]
    workflow: WorkflowConfig,

    #[command(subcommand)]
    command: OrdersSubcommand,
}

#[derive(Debug, Subcommand)]
enum OrdersSubcommand {
    /// Place an order and reserve its stock
    Place(place::PlaceOrderArgs),

    /// Move an order to a new status
    Status(status::UpdateStatusArgs),

    /// Set an order's payment status
    Payment(payment::UpdatePaymentArgs),

    /// Show one order
    Show(show::ShowOrderArgs),

    /// List orders, newest first
    List(list::ListOrdersArgs),
}

pub(crate) async fn run(command: OrdersCommand) -> Result<(), String> {
    let app = AppContext::from_database_url(
        &command.database.database_url,
        &command.database.pool_settings(),
        command.workflow.settings(),
    )
    .await
    .map_err(|error| format!("failed to initialize app context: {error}"))?;

    match command.command {
        OrdersSubcommand::Place(args) => place::run(&app, args).await,
        OrdersSubcommand::Status(args) => status::run(&app, args).await,
        OrdersSubcommand::Payment(args) => payment::run(&app, args).await,
        OrdersSubcommand::Show(args) => show::run(&app, args).await,
        OrdersSubcommand::List(args) => list::run(&app, args).await,
    }
}
