use super::commands::side_from_code;
use super::settings::{BiboxSettings, MarketPair};
use super::types::{
    BiboxAssets, BiboxError, BiboxOrder, DepthLevel, DepthSnapshot, FlatBalances, FlatOrder,
};
use crate::core::errors::ExchangeError;
use crate::core::types::{AccountBalances, AssetBalance, Order, OrderBookEntry, OrderSide, Ticker};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

pub fn parse_response(raw: &[u8]) -> Result<Value, ExchangeError> {
    Ok(serde_json::from_slice(raw)?)
}

fn code_of(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Turn a non-null `error` value into an exchange rejection
fn rejection(error: &Value) -> ExchangeError {
    match serde_json::from_value::<BiboxError>(error.clone()) {
        Ok(BiboxError { code, msg }) => ExchangeError::ApiError {
            code: code.as_ref().and_then(code_of).unwrap_or(-1),
            message: msg,
        },
        Err(_) => ExchangeError::ApiError {
            code: -1,
            message: error
                .as_str()
                .map_or_else(|| error.to_string(), str::to_string),
        },
    }
}

fn error_field(value: &Value) -> Option<&Value> {
    value.get("error").filter(|error| !error.is_null())
}

/// Batched shape: a non-null `error` rejects the call, otherwise the payload
/// is `result[0].result`.
pub fn batched_payload(mut response: Value) -> Result<Value, ExchangeError> {
    if let Some(error) = error_field(&response) {
        return Err(rejection(error));
    }

    let entry = response
        .get_mut("result")
        .and_then(|result| result.get_mut(0))
        .ok_or_else(|| ExchangeError::InvalidResponseFormat("missing result[0]".to_string()))?;

    if let Some(error) = error_field(entry) {
        return Err(rejection(error));
    }

    entry
        .get_mut("result")
        .map(Value::take)
        .ok_or_else(|| ExchangeError::InvalidResponseFormat("missing result[0].result".to_string()))
}

/// Flat shape: `result` must be `true` or `"true"`; otherwise `message`
/// explains the rejection. The payload is the whole object.
pub fn flat_payload(response: Value) -> Result<Value, ExchangeError> {
    let accepted = match response.get("result") {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(flag)) => flag.eq_ignore_ascii_case("true"),
        _ => false,
    };

    if accepted {
        return Ok(response);
    }

    Err(ExchangeError::ApiError {
        code: response.get("code").and_then(code_of).unwrap_or(-1),
        message: response
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("request rejected without a message")
            .to_string(),
    })
}

pub fn balances_from_assets(assets: BiboxAssets, mut balances: AccountBalances) -> AccountBalances {
    for asset in assets.assets_list {
        balances.set(&asset.coin_symbol, asset.balance, asset.freeze);
    }
    balances
}

pub fn balances_from_flat(flat: FlatBalances, mut balances: AccountBalances) -> AccountBalances {
    let mut merged: BTreeMap<String, AssetBalance> = BTreeMap::new();
    for (asset, amount) in flat.available {
        merged.entry(asset.to_uppercase()).or_default().available = amount;
    }
    for (asset, amount) in flat.locked {
        merged.entry(asset.to_uppercase()).or_default().frozen = amount;
    }

    for (asset, balance) in merged {
        balances.set(&asset, balance.available, balance.frozen);
    }
    balances
}

/// Uniform form of a native pair, `BTC_USDT` -> `BTC/USDT`
pub fn uniform_symbol(settings: &BiboxSettings, native: &str) -> String {
    settings.market_by_native(native).map_or_else(
        || native.trim().to_uppercase().replacen('_', "/", 1),
        |pair| pair.symbol.to_string(),
    )
}

pub fn order_from_bibox(
    order: BiboxOrder,
    settings: &BiboxSettings,
    market: &MarketPair,
) -> Result<Order, ExchangeError> {
    let side = side_from_code(order.order_side).ok_or_else(|| {
        ExchangeError::InvalidResponseFormat(format!("unknown order_side: {}", order.order_side))
    })?;

    let symbol = match (&order.pair, &order.coin_symbol, &order.currency_symbol) {
        (Some(pair), _, _) => uniform_symbol(settings, pair),
        (None, Some(coin), Some(currency)) => settings.market_by_assets(coin, currency).map_or_else(
            || format!("{}/{}", coin.to_uppercase(), currency.to_uppercase()),
            |pair| pair.symbol.to_string(),
        ),
        _ => market.symbol.to_string(),
    };

    Ok(Order {
        id: order.id,
        price: order.price,
        amount: order.amount,
        deal_amount: order.deal_amount,
        side,
        symbol,
    })
}

pub fn order_from_flat(
    order: FlatOrder,
    settings: &BiboxSettings,
    market: &MarketPair,
) -> Result<Order, ExchangeError> {
    let side = match order.side.trim().to_lowercase().as_str() {
        "buy" => OrderSide::Buy,
        "sell" => OrderSide::Sell,
        other => {
            return Err(ExchangeError::InvalidResponseFormat(format!(
                "unknown order type: {}",
                other
            )))
        }
    };

    let symbol = order.currency_pair.as_deref().map_or_else(
        || market.symbol.to_string(),
        |pair| uniform_symbol(settings, pair),
    );

    Ok(Order {
        id: order.order_number,
        price: order.rate,
        amount: order.initial_amount,
        deal_amount: order.filled_amount,
        side,
        symbol,
    })
}

/// Depth from the market-data host; the book may sit under `result` or at
/// the top level.
pub fn batched_depth(mut response: Value) -> Result<DepthSnapshot, ExchangeError> {
    if let Some(error) = error_field(&response) {
        return Err(rejection(error));
    }

    let nested = response
        .get("result")
        .is_some_and(|result| result.get("bids").is_some() || result.get("asks").is_some());
    let book = if nested {
        response.get_mut("result").map_or(Value::Null, Value::take)
    } else {
        response
    };

    Ok(serde_json::from_value(book)?)
}

pub fn flat_depth(response: Value) -> Result<DepthSnapshot, ExchangeError> {
    Ok(serde_json::from_value(flat_payload(response)?)?)
}

fn entry(level: DepthLevel) -> OrderBookEntry {
    OrderBookEntry {
        price: level.0,
        amount: level.1,
    }
}

/// Book sides in ticker order: bids descending, asks ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedDepth {
    pub bids: Vec<OrderBookEntry>,
    pub asks: Vec<OrderBookEntry>,
    /// A side was still out of order after applying the native ordering
    pub resorted: bool,
}

/// Bids keep native order, asks are reversed when the feed lists them
/// far-to-near. A side still out of order afterwards is sorted, reported and
/// flagged in `resorted`.
pub fn order_depth(depth: DepthSnapshot, asks_descending: bool) -> OrderedDepth {
    let mut bids: Vec<OrderBookEntry> = depth.bids.into_iter().map(entry).collect();
    let mut asks: Vec<OrderBookEntry> = depth.asks.into_iter().map(entry).collect();
    if asks_descending {
        asks.reverse();
    }

    let mut resorted = false;
    if !bids.windows(2).all(|w| w[0].price >= w[1].price) {
        warn!(levels = bids.len(), "bids not in descending order, sorting");
        bids.sort_by(|a, b| b.price.total_cmp(&a.price));
        resorted = true;
    }
    if !asks.windows(2).all(|w| w[0].price <= w[1].price) {
        warn!(levels = asks.len(), "asks not in ascending order, sorting");
        asks.sort_by(|a, b| a.price.total_cmp(&b.price));
        resorted = true;
    }

    OrderedDepth {
        bids,
        asks,
        resorted,
    }
}

pub fn ticker_from_depth(
    depth: DepthSnapshot,
    asks_descending: bool,
) -> Result<Ticker, ExchangeError> {
    let OrderedDepth { bids, asks, .. } = order_depth(depth, asks_descending);
    Ticker::from_depth(bids, asks).map_err(|e| ExchangeError::InvalidResponseFormat(e.to_string()))
}
