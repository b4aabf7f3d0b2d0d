use std::sync::Arc;

use anyhow::{Context, bail};
use packdesk_client::logger::{LogSettings, init_logger};
use packdesk_client::{
    ClientConfig, FulfillmentStatus, PickSession, PushOutcome, RestApi, StockSession, WarehouseApi,
};

const USAGE: &str = "usage: packdesk <list [status|all] | pull | push | stock-sync>";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_logger(&LogSettings::from_env())?;

    let config = ClientConfig::from_env();
    tracing::debug!(base_url = %config.base_url, "Packdesk starting");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let api: Arc<dyn WarehouseApi> = Arc::new(RestApi::new(&config)?);

    match args.first().map(String::as_str) {
        Some("list") => list(api, config, args.get(1).map(String::as_str)).await,
        Some("pull") => pull(api, config).await,
        Some("push") => push(api, config).await,
        Some("stock-sync") => stock_sync(api, &config).await,
        _ => bail!(USAGE),
    }
}

async fn list(
    api: Arc<dyn WarehouseApi>,
    config: ClientConfig,
    status: Option<&str>,
) -> anyhow::Result<()> {
    let filter = match status {
        None => Some(FulfillmentStatus::Processing),
        Some("all") => None,
        Some(s) => Some(s.parse::<FulfillmentStatus>()?),
    };

    let mut session = PickSession::new(api, config);
    session.set_filter_status(filter);
    session.refresh().await.context("failed to fetch orders")?;

    for order in session.store().filtered_orders() {
        println!(
            "{:<12} {:<18} {:>3} items  qty {}",
            order.order_number,
            order.fulfillment_status.as_str(),
            order.items.len(),
            order.total_quantity()
        );
    }
    Ok(())
}

async fn pull(api: Arc<dyn WarehouseApi>, config: ClientConfig) -> anyhow::Result<()> {
    let mut session = PickSession::new(api, config);
    session.pull_new_orders().await?;
    println!("{} orders loaded", session.store().orders().len());
    Ok(())
}

async fn push(api: Arc<dyn WarehouseApi>, config: ClientConfig) -> anyhow::Result<()> {
    let mut session = PickSession::new(api, config);
    session.refresh().await.context("failed to fetch orders")?;

    let outcome = tokio::select! {
        outcome = session.push_packed_statuses() => outcome?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted, stopping status sync");
            return Ok(());
        }
    };

    match outcome {
        PushOutcome::NothingToSync => println!("No packed orders to sync"),
        PushOutcome::Synced { order_ids } => println!("Synced orders: {order_ids:?}"),
    }
    session.shutdown().await;
    Ok(())
}

async fn stock_sync(api: Arc<dyn WarehouseApi>, config: &ClientConfig) -> anyhow::Result<()> {
    let mut session = StockSession::new(api, config);
    session.load().await?;
    let count = session.store().pending().len();
    session.sync().await?;
    println!("{count} pending adjustments submitted");
    Ok(())
}
