use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

use customer_service::client::Client;
use customer_service::config::{load_config, InstanceConfig, ServiceConfig};
use customer_service::discovery::StaticRegistry;
use customer_service::{Address, Context, Customer, Service};

#[derive(Parser)]
#[command(name = "customer-cli")]
#[command(about = "Client for the customer service", long_about = None)]
struct Cli {
    /// Comma-separated instance addresses (host:port or URL).
    #[arg(short, long, value_delimiter = ',', conflicts_with = "registry")]
    instances: Vec<String>,

    /// TOML registry file with [[instances]] tables.
    #[arg(short, long)]
    registry: Option<PathBuf>,

    /// TOML configuration file (client, retry and health check sections).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Overall deadline for the call, in seconds.
    #[arg(long, default_value_t = 10)]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a customer
    Create {
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        phone: String,
    },
    /// Fetch a customer
    Get { id: String },
    /// Create or overwrite a customer
    Replace {
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        phone: String,
    },
    /// Change only the given fields of a customer
    Update {
        id: String,
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        phone: String,
    },
    /// Delete a customer
    Delete { id: String },
    /// List a customer's addresses
    Addresses { id: String },
    /// Fetch one address
    GetAddress { id: String, address_id: String },
    /// Add an address to a customer
    AddAddress {
        id: String,
        address_id: String,
        #[arg(long)]
        location: String,
    },
    /// Remove an address from a customer
    RemoveAddress { id: String, address_id: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };
    // One-shot calls gain nothing from background probing.
    config.health_check.enabled = false;

    let client = if !cli.instances.is_empty() {
        let instances: Vec<InstanceConfig> = cli
            .instances
            .iter()
            .map(|address| InstanceConfig {
                id: address.clone(),
                service: config.client.service_name.clone(),
                address: address.clone(),
                tags: config.client.tags.clone(),
            })
            .collect();
        Client::with_registry(&config, std::sync::Arc::new(StaticRegistry::new(&instances)))?
    } else {
        if let Some(path) = cli.registry {
            config.client.registry_file = Some(path);
        }
        Client::connect(&config)?
    };

    let ctx = Context::new().with_timeout(Duration::from_secs(cli.timeout));
    let svc: &dyn Service = &*client;

    match cli.command {
        Commands::Create { id, name, email, phone } => {
            let customer = Customer { phone, ..Customer::new(id, name, email) };
            svc.create_customer(&ctx, customer).await?;
            print_json(&serde_json::json!({}))?;
        }
        Commands::Get { id } => {
            print_json(&svc.get_customer(&ctx, &id).await?)?;
        }
        Commands::Replace { id, name, email, phone } => {
            let customer = Customer { phone, ..Customer::new(id.clone(), name, email) };
            svc.replace_customer(&ctx, &id, customer).await?;
            print_json(&serde_json::json!({}))?;
        }
        Commands::Update { id, name, email, phone } => {
            let partial = Customer { name, email, phone, ..Customer::default() };
            svc.update_customer(&ctx, &id, partial).await?;
            print_json(&serde_json::json!({}))?;
        }
        Commands::Delete { id } => {
            svc.delete_customer(&ctx, &id).await?;
            print_json(&serde_json::json!({}))?;
        }
        Commands::Addresses { id } => {
            print_json(&svc.list_addresses(&ctx, &id).await?)?;
        }
        Commands::GetAddress { id, address_id } => {
            print_json(&svc.get_address(&ctx, &id, &address_id).await?)?;
        }
        Commands::AddAddress { id, address_id, location } => {
            svc.add_address(&ctx, &id, Address::new(address_id, location)).await?;
            print_json(&serde_json::json!({}))?;
        }
        Commands::RemoveAddress { id, address_id } => {
            svc.remove_address(&ctx, &id, &address_id).await?;
            print_json(&serde_json::json!({}))?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
