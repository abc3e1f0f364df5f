use crate::core::errors::ExchangeError;
use crate::core::journal::TradeJournal;
use crate::core::kernel::RestClient;
use crate::core::traits::MarketDataSource;
use crate::core::types::{Record, Ticker};
use crate::exchanges::bibox::{conversions, rest::BiboxRest};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Bibox market data implementation
pub struct MarketData<R: RestClient> {
    rest: BiboxRest<R>,
    journal: Arc<TradeJournal>,
}

impl<R: RestClient + Clone> MarketData<R> {
    pub fn new(rest: &BiboxRest<R>, journal: Arc<TradeJournal>) -> Self {
        Self {
            rest: rest.clone(),
            journal,
        }
    }
}

#[async_trait]
impl<R: RestClient> MarketDataSource for MarketData<R> {
    #[instrument(skip(self), fields(exchange = "bibox"))]
    async fn get_ticker(&self, symbol: &str) -> Result<Ticker, ExchangeError> {
        self.fetch_ticker(symbol)
            .await
            .inspect_err(|e| self.journal.operation_failed("get_ticker", symbol, 0.0, 0.0, e))
    }

    /// Candlesticks are not offered; every call yields no records
    #[instrument(skip(self), fields(exchange = "bibox"))]
    async fn get_records(&self, symbol: &str, period: &str) -> Result<Vec<Record>, ExchangeError> {
        debug!(
            native_period = self.rest.settings().record_period(period),
            "candlesticks are not offered, returning no records"
        );
        Ok(Vec::new())
    }
}

impl<R: RestClient> MarketData<R> {
    async fn fetch_ticker(&self, symbol: &str) -> Result<Ticker, ExchangeError> {
        let settings = self.rest.settings();
        let market = settings.market(symbol)?;
        let protocol = self.rest.protocol();

        let url = protocol.ticker_url(settings, market);
        let response = self.rest.get_public(&url).await?;
        let depth = protocol.decode_depth(response)?;
        conversions::ticker_from_depth(depth, protocol.asks_descending())
    }
}
