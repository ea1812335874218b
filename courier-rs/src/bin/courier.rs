//! courier CLI: migrate the store, create and show deliveries, run the outbox relay.

use std::error::Error;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};

use courier_core::{ChannelBus, DeliveryStore, OrderId, OutboxRelay, SqliteStore};
use courier_rs::api::DeliveryEndpoint;
use courier_rs::application::{DeliveryIntake, DeliveryService};
use courier_rs::config::Settings;
use courier_rs::geo::AddressValidator;
use courier_rs::logging;

type BoxError = Box<dyn Error + Send + Sync>;

#[derive(Parser)]
#[command(name = "courier")]
#[command(about = "Order delivery intake")]
struct Cli {
    #[command(flatten)]
    settings: Settings,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema.
    Migrate,
    /// Create the delivery for an order.
    Create {
        #[arg(long)]
        order_id: i64,
        #[arg(long)]
        address: String,
    },
    /// Print the delivery recorded for an order.
    Show {
        #[arg(long)]
        order_id: i64,
    },
    /// Publish pending outbox facts as JSON lines on stdout.
    Relay {
        /// Keep polling until Ctrl-C.
        #[arg(long)]
        watch: bool,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<(), BoxError> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

async fn open_store(settings: &Settings) -> Result<Arc<SqliteStore>, BoxError> {
    let store = SqliteStore::connect(&settings.database_url, settings.max_connections).await?;
    store.migrate().await?;
    Ok(Arc::new(store))
}

async fn create(settings: &Settings, order_id: i64, address: &str) -> Result<ExitCode, BoxError> {
    let store = open_store(settings).await?;
    let validator =
        AddressValidator::new(settings.geo_provider()?).with_timeout(settings.geocoder_timeout());
    let intake = DeliveryIntake::new(store.clone(), store.clone());
    let service = DeliveryService::new(validator, intake, store);
    let endpoint = DeliveryEndpoint::new(Arc::new(service));

    match endpoint.create_delivery(OrderId::new(order_id), address).await {
        Ok(response) => {
            print_json(&response)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            print_json(&e)?;
            if e.status().is_client_error() {
                Ok(ExitCode::from(1))
            } else {
                Ok(ExitCode::from(2))
            }
        }
    }
}

async fn show(settings: &Settings, order_id: i64) -> Result<ExitCode, BoxError> {
    let store = open_store(settings).await?;
    match store.find_by_order(OrderId::new(order_id)).await? {
        Some(record) => {
            print_json(&record)?;
            Ok(ExitCode::SUCCESS)
        }
        None => {
            eprintln!("no delivery for order #{}", order_id);
            Ok(ExitCode::from(1))
        }
    }
}

async fn relay(settings: &Settings, watch: bool) -> Result<ExitCode, BoxError> {
    let store = open_store(settings).await?;
    let (bus, mut rx) = ChannelBus::new();
    let printer = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            if let Err(e) = print_json(&message) {
                warn!(error = %e, outbox_id = message.id, "failed to print message");
            }
        }
    });

    let relay = OutboxRelay::new(store, Arc::new(bus))
        .batch_size(settings.relay_batch_size)
        .interval(settings.relay_interval());
    let code = if watch {
        info!("relay watching outbox, Ctrl-C to stop");
        relay
            .run(async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    warn!(error = %e, "cannot listen for Ctrl-C");
                }
            })
            .await;
        ExitCode::SUCCESS
    } else {
        match relay.drain().await {
            Ok(n) => {
                info!(published = n, "outbox drained");
                ExitCode::SUCCESS
            }
            Err(e) => {
                warn!(error = %e, "outbox drain stopped early");
                ExitCode::from(2)
            }
        }
    };
    // Dropping the relay closes the bus so the printer finishes.
    drop(relay);
    printer.await?;
    Ok(code)
}

#[tokio::main]
async fn main() -> Result<ExitCode, BoxError> {
    let cli = Cli::parse();
    logging::init(&cli.settings.log_filter);
    let settings = &cli.settings;
    match cli.command {
        Commands::Migrate => {
            open_store(settings).await?;
            info!(database_url = %settings.database_url, "schema up to date");
            Ok(ExitCode::SUCCESS)
        }
        Commands::Create { order_id, ref address } => create(settings, order_id, address).await,
        Commands::Show { order_id } => show(settings, order_id).await,
        Commands::Relay { watch } => relay(settings, watch).await,
    }
}
