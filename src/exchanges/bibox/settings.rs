use crate::core::errors::ExchangeError;
use crate::core::types::Symbol;
use std::collections::{BTreeMap, BTreeSet};

pub const DEFAULT_HOST: &str = "https://api.bibox365.com/v1/";
pub const DEFAULT_MARKET_DATA_HOST: &str = "https://data.bibox.io/api2/1/";
pub const DEFAULT_RATE_LIMIT: f64 = 10.0;
pub const DEFAULT_MIN_AMOUNT: f64 = 0.001;

/// A tradable market. Holding the native pair, the components and the
/// minimum size in one value means a symbol is either fully known or not
/// known at all.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketPair {
    pub symbol: Symbol,
    /// Exchange-native pair string, e.g. `BTC_USDT`
    pub native: String,
    pub min_amount: f64,
}

impl MarketPair {
    pub fn new(
        base: impl Into<String>,
        quote: impl Into<String>,
        min_amount: f64,
    ) -> Result<Self, ExchangeError> {
        let symbol = Symbol::new(base, quote)?;
        let native = format!("{}_{}", symbol.base, symbol.quote);
        Ok(Self {
            symbol,
            native,
            min_amount,
        })
    }

    pub fn base(&self) -> &str {
        &self.symbol.base
    }

    pub fn quote(&self) -> &str {
        &self.symbol.quote
    }
}

/// Static exchange tables: markets, hosts, default pacing and the
/// candlestick period names.
#[derive(Debug, Clone)]
pub struct BiboxSettings {
    pub host: String,
    pub market_data_host: String,
    pub default_rate: f64,
    markets: BTreeMap<String, MarketPair>,
    record_periods: BTreeMap<&'static str, &'static str>,
}

impl Default for BiboxSettings {
    fn default() -> Self {
        let markets = ["BTC", "ETH", "EOS", "ONT", "QTUM"]
            .into_iter()
            .filter_map(|base| MarketPair::new(base, "USDT", DEFAULT_MIN_AMOUNT).ok())
            .map(|pair| (pair.symbol.to_string(), pair))
            .collect();

        let record_periods = [
            ("M", "1min"),
            ("M5", "5min"),
            ("M15", "15min"),
            ("M30", "30min"),
            ("H", "1hour"),
            ("D", "1day"),
            ("W", "1week"),
        ]
        .into_iter()
        .collect();

        Self {
            host: DEFAULT_HOST.to_string(),
            market_data_host: DEFAULT_MARKET_DATA_HOST.to_string(),
            default_rate: DEFAULT_RATE_LIMIT,
            markets,
            record_periods,
        }
    }
}

impl BiboxSettings {
    /// Settings with no markets, for callers that list their own
    pub fn empty() -> Self {
        Self {
            markets: BTreeMap::new(),
            ..Self::default()
        }
    }

    /// Add or replace a market
    pub fn with_market(mut self, pair: MarketPair) -> Self {
        self.markets.insert(pair.symbol.to_string(), pair);
        self
    }

    /// Resolve a uniform symbol (any case) or fail with an unrecognized-symbol error
    pub fn market(&self, symbol: &str) -> Result<&MarketPair, ExchangeError> {
        self.markets
            .get(&symbol.trim().to_uppercase())
            .ok_or_else(|| ExchangeError::unrecognized_symbol(symbol))
    }

    pub fn market_by_native(&self, native: &str) -> Option<&MarketPair> {
        let native = native.trim().to_uppercase();
        self.markets.values().find(|pair| pair.native == native)
    }

    pub fn market_by_assets(&self, base: &str, quote: &str) -> Option<&MarketPair> {
        self.markets.values().find(|pair| {
            pair.base().eq_ignore_ascii_case(base) && pair.quote().eq_ignore_ascii_case(quote)
        })
    }

    pub fn markets(&self) -> impl Iterator<Item = &MarketPair> {
        self.markets.values()
    }

    pub fn min_amount(&self, symbol: &str) -> Option<f64> {
        self.market(symbol).ok().map(|pair| pair.min_amount)
    }

    /// Every asset appearing in a configured market
    pub fn known_assets(&self) -> BTreeSet<String> {
        self.markets
            .values()
            .flat_map(|pair| [pair.base().to_string(), pair.quote().to_string()])
            .collect()
    }

    /// Exchange name of a candlestick period (`M`, `M5`, ... `W`)
    pub fn record_period(&self, period: &str) -> Option<&'static str> {
        self.record_periods
            .get(period.trim().to_uppercase().as_str())
            .copied()
    }
}
