use bibox_connector::core::config::ExchangeConfig;
use bibox_connector::{BiboxBuilder, ExchangeConnector, MarketDataSource};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    // Credentials come from BIBOX_API_KEY / BIBOX_SECRET_KEY; the ticker is public
    let config = ExchangeConfig::from_env("BIBOX").unwrap_or_else(|_| ExchangeConfig::read_only());
    let bibox = BiboxBuilder::new().with_config(config).build()?;

    println!("Fetching BTC/USDT depth from {}...", bibox.get_name());
    match bibox.get_ticker("BTC/USDT").await {
        Ok(ticker) => {
            println!(
                "bid {} / ask {} (mid {}), {} bid and {} ask levels",
                ticker.buy,
                ticker.sell,
                ticker.mid,
                ticker.bids.len(),
                ticker.asks.len()
            );
        }
        Err(e) => {
            println!("Error fetching ticker ({:?}): {}", e.kind(), e);
        }
    }

    println!(
        "Minimum BTC/USDT order: {:?}",
        bibox.get_min_amount("BTC/USDT")
    );

    Ok(())
}
