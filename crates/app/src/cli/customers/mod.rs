use clap::{Args, Subcommand};

mod create;

#[derive(Debug, Args)]
pub(crate) struct CustomersCommand {
    #[command(subcommand)]
    command: CustomersSubcommand,
}

#[derive(Debug, Subcommand)]
enum CustomersSubcommand {
    /// Register a customer
    Create(create::CreateCustomerArgs),
}

pub(crate) async fn run(command: CustomersCommand) -> Result<(), String> {
    match command.command {
        CustomersSubcommand::Create(args) => create::run(args).await,
    }
}
