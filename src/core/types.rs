use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Typed errors for the types subsystem
#[derive(Error, Debug)]
pub enum TypesError {
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),
    #[error("unrecognized side: {0}")]
    InvalidSide(String),
    #[error("Parsing error: {0}")]
    ParseError(String),
}

/// Uniform trading pair, written `BASE/QUOTE`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Symbol {
    pub base: String,
    pub quote: String,
}

impl Symbol {
    /// Create a new symbol with validation
    pub fn new(base: impl Into<String>, quote: impl Into<String>) -> Result<Self, TypesError> {
        let base = base.into().to_uppercase();
        let quote = quote.into().to_uppercase();

        if base.is_empty() || quote.is_empty() {
            return Err(TypesError::InvalidSymbol(
                "Base and quote assets cannot be empty".to_string(),
            ));
        }

        Ok(Self { base, quote })
    }

    /// Parse a uniform symbol string like `"btc/usdt"`
    pub fn from_string(symbol: &str) -> Result<Self, TypesError> {
        let (base, quote) = symbol
            .split_once('/')
            .ok_or_else(|| TypesError::InvalidSymbol(symbol.to_string()))?;
        Self::new(base.trim(), quote.trim())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderSide {
    type Err = TypesError;

    /// Accepts `buy`/`sell` and the market-order spellings in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "BUY" | "BUY_MARKET" => Ok(Self::Buy),
            "SELL" | "SELL_MARKET" => Ok(Self::Sell),
            _ => Err(TypesError::InvalidSide(s.to_string())),
        }
    }
}

/// An order as reported by the exchange. Re-query for fresh fill state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub price: f64,
    pub amount: f64,
    pub deal_amount: f64,
    pub side: OrderSide,
    pub symbol: String,
}

impl Order {
    /// Unfilled part of the order.
    pub fn remaining(&self) -> f64 {
        self.amount - self.deal_amount
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderBookEntry {
    pub price: f64,
    pub amount: f64,
}

/// Top of book plus full depth. Bids descend by price, asks ascend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticker {
    pub buy: f64,
    pub sell: f64,
    pub mid: f64,
    pub bids: Vec<OrderBookEntry>,
    pub asks: Vec<OrderBookEntry>,
}

impl Ticker {
    /// Build a ticker from ordered depth; both sides must be non-empty.
    pub fn from_depth(
        bids: Vec<OrderBookEntry>,
        asks: Vec<OrderBookEntry>,
    ) -> Result<Self, TypesError> {
        let (Some(best_bid), Some(best_ask)) = (bids.first(), asks.first()) else {
            return Err(TypesError::ParseError(
                "can not get enough bids or asks".to_string(),
            ));
        };
        let buy = best_bid.price;
        let sell = best_ask.price;

        Ok(Self {
            buy,
            sell,
            mid: (buy + sell) / 2.0,
            bids,
            asks,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetBalance {
    pub available: f64,
    pub frozen: f64,
}

/// Balances keyed by upper-case asset code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountBalances {
    assets: BTreeMap<String, AssetBalance>,
}

impl AccountBalances {
    /// Every listed asset starts at zero so lookups never miss.
    pub fn seeded<I, S>(assets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let assets = assets
            .into_iter()
            .map(|asset| (asset.as_ref().to_uppercase(), AssetBalance::default()))
            .collect();
        Self { assets }
    }

    pub fn set(&mut self, asset: &str, available: f64, frozen: f64) {
        self.assets
            .insert(asset.to_uppercase(), AssetBalance { available, frozen });
    }

    pub fn get(&self, asset: &str) -> Option<&AssetBalance> {
        self.assets.get(&asset.to_uppercase())
    }

    pub fn available(&self, asset: &str) -> f64 {
        self.get(asset).map_or(0.0, |b| b.available)
    }

    pub fn frozen(&self, asset: &str) -> f64 {
        self.get(asset).map_or(0.0, |b| b.frozen)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AssetBalance)> {
        self.assets.iter()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Legacy flat layout: `BTC` holds available, `FrozenBTC` holds frozen.
    pub fn to_flat_map(&self) -> BTreeMap<String, f64> {
        let mut flat = BTreeMap::new();
        for (asset, balance) in &self.assets {
            flat.insert(asset.clone(), balance.available);
            flat.insert(format!("Frozen{}", asset), balance.frozen);
        }
        flat
    }
}

/// Candlestick bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_parsing() {
        let symbol = Symbol::from_string("eth/usdt").unwrap();
        assert_eq!(symbol.base, "ETH");
        assert_eq!(symbol.quote, "USDT");
        assert_eq!(symbol.to_string(), "ETH/USDT");
        assert!(Symbol::from_string("ETHUSDT").is_err());
        assert!(Symbol::from_string("/USDT").is_err());
    }

    #[test]
    fn test_order_side_from_str() {
        assert_eq!("buy".parse::<OrderSide>().unwrap(), OrderSide::Buy);
        assert_eq!("SELL".parse::<OrderSide>().unwrap(), OrderSide::Sell);
        assert_eq!("sell_market".parse::<OrderSide>().unwrap(), OrderSide::Sell);
        assert!("hold".parse::<OrderSide>().is_err());
    }

    #[test]
    fn test_ticker_requires_both_sides() {
        let bid = OrderBookEntry {
            price: 99.0,
            amount: 1.0,
        };
        assert!(Ticker::from_depth(vec![bid], Vec::new()).is_err());
        assert!(Ticker::from_depth(Vec::new(), vec![bid]).is_err());

        let ask = OrderBookEntry {
            price: 101.0,
            amount: 2.0,
        };
        let ticker = Ticker::from_depth(vec![bid], vec![ask]).unwrap();
        assert_eq!(ticker.buy, 99.0);
        assert_eq!(ticker.sell, 101.0);
        assert_eq!(ticker.mid, 100.0);
    }

    #[test]
    fn test_balances_flat_map() {
        let mut balances = AccountBalances::seeded(["usdt", "BTC"]);
        balances.set("btc", 1.5, 0.5);
        balances.set("XRP", 3.0, 0.0);

        let flat = balances.to_flat_map();
        assert_eq!(flat["BTC"], 1.5);
        assert_eq!(flat["FrozenBTC"], 0.5);
        assert_eq!(flat["USDT"], 0.0);
        assert_eq!(flat["FrozenUSDT"], 0.0);
        assert_eq!(flat["XRP"], 3.0);
        assert_eq!(flat.len(), 6);
    }

    #[test]
    fn test_order_remaining() {
        let order = Order {
            id: "1".to_string(),
            price: 100.0,
            amount: 10.0,
            deal_amount: 3.0,
            side: OrderSide::Buy,
            symbol: "BTC/USDT".to_string(),
        };
        assert_eq!(order.remaining(), 7.0);
    }
}
