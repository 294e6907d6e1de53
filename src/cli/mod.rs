pub mod commands;
pub mod config;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::models::{InventoryBatch, PurchaseOrder, ShipmentOrder, ShipmentPartner, Supplier, Ticket};
use crate::shell::Page;
use commands::resource::ResourceCommands;

#[derive(Parser)]
#[command(name = "stockroom")]
#[command(about = "Stockroom CLI - inventory, suppliers, orders and shipments")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Login, registration and session management")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Dashboard figures")]
    Home,

    #[command(about = "Product categories")]
    Categories {
        #[command(subcommand)]
        cmd: ResourceCommands,
    },

    #[command(about = "Products")]
    Products {
        #[command(subcommand)]
        cmd: ResourceCommands,
    },

    #[command(about = "Inventory batches")]
    Inventory {
        #[command(subcommand)]
        cmd: ResourceCommands,
    },

    #[command(about = "Suppliers")]
    Suppliers {
        #[command(subcommand)]
        cmd: ResourceCommands,
    },

    #[command(about = "Purchase orders")]
    Orders {
        #[command(subcommand)]
        cmd: ResourceCommands,
    },

    #[command(about = "Delivery partners")]
    Partners {
        #[command(subcommand)]
        cmd: ResourceCommands,
    },

    #[command(about = "Shipment orders")]
    Shipments {
        #[command(subcommand)]
        cmd: ResourceCommands,
    },

    #[command(about = "Operational tickets (low stock, expiry)")]
    Tickets {
        #[command(subcommand)]
        cmd: ResourceCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Auth { cmd } => commands::auth::handle(cmd, output_format).await,
        Commands::Home => commands::home::handle(output_format).await,
        Commands::Categories { cmd } => commands::catalog::handle_categories(cmd, output_format).await,
        Commands::Products { cmd } => commands::catalog::handle_products(cmd, output_format).await,
        Commands::Inventory { cmd } => {
            commands::resource::handle::<InventoryBatch>(Page::Inventory, cmd, output_format).await
        }
        Commands::Suppliers { cmd } => commands::resource::handle::<Supplier>(Page::Suppliers, cmd, output_format).await,
        Commands::Orders { cmd } => {
            commands::resource::handle::<PurchaseOrder>(Page::PurchaseOrders, cmd, output_format).await
        }
        Commands::Partners { cmd } => {
            commands::resource::handle::<ShipmentPartner>(Page::Shipments, cmd, output_format).await
        }
        Commands::Shipments { cmd } => {
            commands::resource::handle::<ShipmentOrder>(Page::Shipments, cmd, output_format).await
        }
        Commands::Tickets { cmd } => commands::resource::handle::<Ticket>(Page::Notifications, cmd, output_format).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_resource_commands() {
        let cli = Cli::try_parse_from([
            "stockroom", "--json", "suppliers", "create", "--set", "name=Acme", "--set", "address=1 Main St",
        ])
        .unwrap();
        assert!(matches!(OutputFormat::from_cli(&cli), OutputFormat::Json));
        match cli.command {
            Commands::Suppliers { cmd: ResourceCommands::Create { set, image } } => {
                assert_eq!(set, ["name=Acme", "address=1 Main St"]);
                assert!(image.is_none());
            }
            _ => panic!("expected suppliers create"),
        }

        let cli = Cli::try_parse_from(["stockroom", "orders", "list", "--sort", "status", "--desc", "--page", "2"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Orders { cmd: ResourceCommands::List { desc: true, page: 2, .. } }
        ));
    }
}
