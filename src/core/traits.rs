use crate::core::{
    errors::ExchangeError,
    types::{AccountBalances, Order, Record, Ticker},
};
use async_trait::async_trait;

#[async_trait]
pub trait AccountInfo {
    /// Balances for every known asset; fails as a whole, never partially filled
    async fn get_account(&self) -> Result<AccountBalances, ExchangeError>;
}

#[async_trait]
pub trait OrderPlacer {
    /// Validate `side` and `symbol`, then dispatch to `buy` or `sell`
    async fn trade(
        &self,
        side: &str,
        symbol: &str,
        price: f64,
        amount: f64,
        notes: &[&str],
    ) -> Result<String, ExchangeError>;

    /// Place a limit buy; returns the exchange-assigned order id
    async fn buy(
        &self,
        symbol: &str,
        price: f64,
        amount: f64,
        notes: &[&str],
    ) -> Result<String, ExchangeError>;

    /// Place a limit sell; returns the exchange-assigned order id
    async fn sell(
        &self,
        symbol: &str,
        price: f64,
        amount: f64,
        notes: &[&str],
    ) -> Result<String, ExchangeError>;

    async fn get_order(&self, symbol: &str, id: &str) -> Result<Order, ExchangeError>;

    /// Open orders, buy side first
    async fn get_orders(&self, symbol: &str) -> Result<Vec<Order>, ExchangeError>;

    /// Recently closed orders; empty where the protocol has no history endpoint
    async fn get_trades(&self, symbol: &str) -> Result<Vec<Order>, ExchangeError>;

    async fn cancel_order(&self, order: &Order) -> Result<bool, ExchangeError>;
}

#[async_trait]
pub trait MarketDataSource {
    async fn get_ticker(&self, symbol: &str) -> Result<Ticker, ExchangeError>;

    /// Candlesticks. Not offered by Bibox; always empty, never an error
    async fn get_records(&self, symbol: &str, period: &str) -> Result<Vec<Record>, ExchangeError>;
}

/// The uniform interface a strategy drives.
pub trait ExchangeConnector: AccountInfo + OrderPlacer + MarketDataSource + Send + Sync {
    fn get_type(&self) -> &str;

    fn get_name(&self) -> &str;

    /// Minimum order size for a symbol; no network access
    fn get_min_amount(&self, symbol: &str) -> Option<f64>;

    /// Set the calls-per-second ceiling; returns the new value
    fn set_limit(&self, rate: f64) -> f64;

    fn limit(&self) -> f64;

    fn log(&self, message: &str);
}
