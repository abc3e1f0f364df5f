use crate::core::errors::ExchangeError;
use crate::core::journal::TradeJournal;
use crate::core::kernel::RestClient;
use crate::core::traits::{AccountInfo, ExchangeConnector, MarketDataSource, OrderPlacer};
use crate::core::types::{AccountBalances, Order, Record, Ticker};
use crate::exchanges::bibox::{protocol::ProtocolVariant, rest::BiboxRest};
use async_trait::async_trait;
use std::sync::Arc;

pub mod account;
pub mod market_data;
pub mod trading;

pub use account::Account;
pub use market_data::MarketData;
pub use trading::Trading;

/// Bibox connector that composes all sub-trait implementations
pub struct BiboxConnector<R: RestClient> {
    pub market: MarketData<R>,
    pub trading: Trading<R>,
    pub account: Account<R>,
    rest: BiboxRest<R>,
    journal: Arc<TradeJournal>,
    exchange_type: String,
    exchange_name: String,
}

impl<R: RestClient + Clone> BiboxConnector<R> {
    pub fn new(
        rest: BiboxRest<R>,
        journal: Arc<TradeJournal>,
        exchange_type: String,
        exchange_name: String,
    ) -> Self {
        Self {
            market: MarketData::new(&rest, journal.clone()),
            trading: Trading::new(&rest, journal.clone()),
            account: Account::new(&rest, journal.clone()),
            rest,
            journal,
            exchange_type,
            exchange_name,
        }
    }
}

impl<R: RestClient> BiboxConnector<R> {
    pub fn protocol_variant(&self) -> ProtocolVariant {
        self.rest.protocol().variant()
    }
}

#[async_trait]
impl<R: RestClient> AccountInfo for BiboxConnector<R> {
    async fn get_account(&self) -> Result<AccountBalances, ExchangeError> {
        self.account.get_account().await
    }
}

#[async_trait]
impl<R: RestClient> OrderPlacer for BiboxConnector<R> {
    async fn trade(
        &self,
        side: &str,
        symbol: &str,
        price: f64,
        amount: f64,
        notes: &[&str],
    ) -> Result<String, ExchangeError> {
        self.trading.trade(side, symbol, price, amount, notes).await
    }

    async fn buy(
        &self,
        symbol: &str,
        price: f64,
        amount: f64,
        notes: &[&str],
    ) -> Result<String, ExchangeError> {
        self.trading.buy(symbol, price, amount, notes).await
    }

    async fn sell(
        &self,
        symbol: &str,
        price: f64,
        amount: f64,
        notes: &[&str],
    ) -> Result<String, ExchangeError> {
        self.trading.sell(symbol, price, amount, notes).await
    }

    async fn get_order(&self, symbol: &str, id: &str) -> Result<Order, ExchangeError> {
        self.trading.get_order(symbol, id).await
    }

    async fn get_orders(&self, symbol: &str) -> Result<Vec<Order>, ExchangeError> {
        self.trading.get_orders(symbol).await
    }

    async fn get_trades(&self, symbol: &str) -> Result<Vec<Order>, ExchangeError> {
        self.trading.get_trades(symbol).await
    }

    async fn cancel_order(&self, order: &Order) -> Result<bool, ExchangeError> {
        self.trading.cancel_order(order).await
    }
}

#[async_trait]
impl<R: RestClient> MarketDataSource for BiboxConnector<R> {
    async fn get_ticker(&self, symbol: &str) -> Result<Ticker, ExchangeError> {
        self.market.get_ticker(symbol).await
    }

    async fn get_records(&self, symbol: &str, period: &str) -> Result<Vec<Record>, ExchangeError> {
        self.market.get_records(symbol, period).await
    }
}

impl<R: RestClient> ExchangeConnector for BiboxConnector<R> {
    fn get_type(&self) -> &str {
        &self.exchange_type
    }

    fn get_name(&self) -> &str {
        &self.exchange_name
    }

    fn get_min_amount(&self, symbol: &str) -> Option<f64> {
        self.rest.settings().min_amount(symbol)
    }

    fn set_limit(&self, rate: f64) -> f64 {
        self.rest.limiter().set_rate(rate)
    }

    fn limit(&self) -> f64 {
        self.rest.limiter().rate()
    }

    fn log(&self, message: &str) {
        self.journal.info(message);
    }
}
