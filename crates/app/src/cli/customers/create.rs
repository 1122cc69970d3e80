use clap::Args;
use storefront_app::domain::customers::{
    CustomersService, PgCustomersService, data::NewCustomer, records::CustomerUuid,
};

use crate::config::DatabaseConfig;

#[derive(Debug, Args)]
pub(crate) struct CreateCustomerArgs {
    #[command(flatten)]
    database: DatabaseConfig,

    /// Display name
    #[arg(long)]
    name: String,

    /// Email address; must be unique
    #[arg(long)]
    email: String,

    /// Optional customer UUID; generated when omitted
    #[arg(long)]
    customer_uuid: Option<CustomerUuid>,
}

pub(crate) async fn run(args: CreateCustomerArgs) -> Result<(), String> {
    if args.email.trim().is_empty() {
        return Err("email cannot be empty".to_string());
    }

    let db = crate::cli::connect(&args.database).await?;

    let customer = PgCustomersService::new(db)
        .create_customer(NewCustomer {
            uuid: args.customer_uuid.unwrap_or_default(),
            name: args.name,
            email: args.email,
        })
        .await
        .map_err(|error| format!("failed to create customer: {error}"))?;

    crate::cli::print_json(&customer)
}
