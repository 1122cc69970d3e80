use clap::{Args, Subcommand};

mod add;
mod price;
mod restock;

#[derive(Debug, Args)]
pub(crate) struct CatalogCommand {
    #[command(subcommand)]
    command: CatalogSubcommand,
}

#[derive(Debug, Subcommand)]
enum CatalogSubcommand {
    /// List a new bicycle
    Add(add::AddBicycleArgs),

    /// Change a bicycle's price
    Price(price::UpdatePriceArgs),

    /// Put units back into stock
    Restock(restock::RestockArgs),
}

pub(crate) async fn run(command: CatalogCommand) -> Result<(), String> {
    match command.command {
        CatalogSubcommand::Add(args) => add::run(args).await,
        CatalogSubcommand::Price(args) => price::run(args).await,
        CatalogSubcommand::Restock(args) => restock::run(args).await,
    }
}
