use anyhow::Context;
use tracing::{info, Instrument};

use escrow_ledger::app_system::{setup_tracing, EscrowSystem};
use escrow_ledger::config::LedgerConfig;
use escrow_ledger::domain::{Address, Amount, OrderCreate, OrderDetails};

const PRODUCER: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";
const CONSUMER: &str = "0x3C44CdDdB6a900fa2b585dd299e03d12FA4293BC";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = LedgerConfig::from_env().context("loading ledger config")?;
    setup_tracing(&config.log_filter);

    info!("Starting escrow ledger walkthrough");

    let system = EscrowSystem::new(config);
    let client = system.ledger_client.clone();

    let producer = Address::new(PRODUCER)?;
    let consumer = Address::new(CONSUMER)?;
    let price = Amount::parse_ether("1.0")?;

    client.deposit(consumer.clone(), Amount::parse_ether("10.0")?).await?;

    let span = tracing::info_span!("order_creation");
    let order_id = async {
        info!(price = %price, "Creating order for Smartphone");
        client
            .create_order(consumer.clone(), OrderCreate::new(producer.clone(), 1, "Smartphone", price))
            .await
    }
    .instrument(span)
    .await?;

    let order_count = client.order_count().await?;
    info!(order_id, order_count, "Order created");

    let delivery_date = chrono::Utc::now().timestamp().max(0) as u64 + 86_400;
    client
        .specify_delivery_date(consumer.clone(), order_id, delivery_date)
        .await?;
    print_details(&client.get_order_details(order_id).await?);

    let span = tracing::info_span!("fulfillment", order_id);
    async {
        client.confirm_shipment(producer.clone(), order_id).await?;
        client.confirm_delivery(consumer.clone(), order_id).await
    }
    .instrument(span)
    .await?;

    let details = client.get_order_details(order_id).await?;
    print_details(&details);
    let producer_balance = client.balance_of(producer).await?;
    let consumer_balance = client.balance_of(consumer).await?;
    let custody = client.custody_balance().await?;
    info!(
        on_time = details.is_delivery_on_time(system.config().on_time_window_secs),
        producer_balance = %producer_balance,
        consumer_balance = %consumer_balance,
        custody = %custody,
        "Settlement complete"
    );

    for event in client.events_since(0).await? {
        println!("{}", event.to_json_line()?);
    }

    system.shutdown().await?;

    info!("Walkthrough completed successfully");
    Ok(())
}

fn print_details(details: &OrderDetails) {
    println!("Order Details:");
    println!("- Consumer: {}", details.consumer);
    println!("- Producer: {}", details.producer);
    println!("- Product ID: {}", details.product_id);
    println!("- Product Name: {}", details.product_name);
    println!("- Product Price: {}", details.product_price);
    println!("- Purchase Time: {}", format_timestamp(details.purchase_time));
    println!("- Delivery Time: {}", format_timestamp(details.delivery_time));
    println!("- Status: {} ({})", details.status, details.status.code());
}

fn format_timestamp(ts: u64) -> String {
    if ts == 0 {
        return "Not available".to_string();
    }
    chrono::DateTime::from_timestamp(ts as i64, 0)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| ts.to_string())
}
