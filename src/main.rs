use clap::{Parser, ValueEnum};
use miette::{IntoDiagnostic, Result, miette};
use ordercore::application::catalog::CatalogService;
use ordercore::application::orders::OrderService;
use ordercore::application::payments::PaymentService;
use ordercore::domain::order::{NewOrderItem, OrderPatch, OrderStatus};
use ordercore::domain::payment::{GatewayConfig, PaymentData};
use ordercore::domain::ports::TransactionalStore;
use ordercore::gateway::{FixedOutcome, GatewayRegistry, OutcomePolicy, RandomOutcome};
use ordercore::infrastructure::in_memory::InMemoryStore;
use ordercore::interfaces::csv::catalog_reader::CatalogReader;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Clone, Copy, ValueEnum)]
enum Outcome {
    Success,
    Failure,
    Random,
}

/// Seeds a catalog, places and confirms an order over it, charges the order
/// through the simulated card gateway, and prints the results as JSON.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Product catalog CSV (name, description, price, stock)
    catalog: PathBuf,

    /// Forced gateway outcome; `random` matches the original 80% simulation.
    #[arg(long, value_enum, default_value = "success")]
    outcome: Outcome,

    /// User id to own the demo order.
    #[arg(long, default_value = "1")]
    user: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();
    let store = Arc::new(InMemoryStore::new());

    let catalog = CatalogService::new(store.clone());
    let file = File::open(&cli.catalog).into_diagnostic()?;
    let mut product_ids = Vec::new();
    for row in CatalogReader::new(file).products() {
        let product = catalog.create(row.into_diagnostic()?).into_diagnostic()?;
        product_ids.push(product.id);
    }
    if product_ids.is_empty() {
        return Err(miette!("catalog is empty"));
    }

    store
        .run_in_transaction(|tables| {
            tables.insert_gateway(GatewayConfig {
                id: 0,
                name: "card".to_string(),
                strategy: "card".to_string(),
                is_active: true,
                config: BTreeMap::from([
                    ("secret_key".to_string(), "sk_demo".to_string()),
                    ("public_key".to_string(), "pk_demo".to_string()),
                ]),
            });
            Ok(())
        })
        .into_diagnostic()?;

    let outcome: Arc<dyn OutcomePolicy> = match cli.outcome {
        Outcome::Success => Arc::new(FixedOutcome(true)),
        Outcome::Failure => Arc::new(FixedOutcome(false)),
        Outcome::Random => Arc::new(RandomOutcome { success_rate: 0.8 }),
    };
    let registry = Arc::new(GatewayRegistry::with_builtins(outcome));

    let orders = OrderService::new(store.clone());
    let payments = PaymentService::new(store.clone(), registry);

    let lines = product_ids
        .iter()
        .map(|&product_id| NewOrderItem {
            product_id,
            quantity: 1,
        })
        .collect();
    let order = orders.create(cli.user, lines).into_diagnostic()?.order;
    orders
        .update(
            order.id,
            OrderPatch {
                status: Some(OrderStatus::Confirmed),
            },
        )
        .into_diagnostic()?;

    let payment = payments
        .process_payment(order.id, "card", PaymentData::default())
        .await
        .into_diagnostic()?;

    let details = orders.get_with_details(order.id).into_diagnostic()?;
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "order": details,
            "payment": payment,
        }))
        .into_diagnostic()?
    );

    Ok(())
}
