use clap::{Parser, Subcommand};
use serde::Serialize;
use storefront_app::database::{self, Db};

use crate::config::{DatabaseConfig, LoggingConfig};

mod catalog;
mod customers;
mod db;
mod orders;

#[derive(Debug, Parser)]
#[command(name = "storefront", about = "Storefront operator CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) logging: LoggingConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Db(db::DbCommand),
    Catalog(catalog::CatalogCommand),
    Customers(customers::CustomersCommand),
    Orders(orders::OrdersCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::Db(command) => db::run(command).await,
            Commands::Catalog(command) => catalog::run(command).await,
            Commands::Customers(command) => customers::run(command).await,
            Commands::Orders(command) => orders::run(command).await,
        }
    }
}

async fn connect(config: &DatabaseConfig) -> Result<Db, String> {
    let pool = database::connect_with(&config.database_url, &config.pool_settings())
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    Ok(Db::new(pool))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|error| format!("failed to encode output: {error}"))?;

    println!("{json}");

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_nested_subcommands() {
        let cli = Cli::try_parse_from([
            "storefront",
            "orders",
            "--database-url",
            "postgresql://localhost/storefront",
            "status",
            "--order",
            "01890a5d-ac96-774b-bcce-b302099a8057",
            "--status",
            "shipped",
        ]);

        assert!(cli.is_ok(), "expected a valid command line, got {cli:?}");
    }
}
