//! Command envelopes sent in the `cmds` form field.
//!
//! Every request carries a batch of exactly one command,
//! `[{"cmd": <name>, "index"?: <n>, "body": {...}}]`. Bodies are typed so
//! field names and numeric encodings cannot drift from the exchange schema.

use crate::core::errors::ExchangeError;
use crate::core::types::OrderSide;
use serde::{Deserialize, Serialize};

pub const TRANSFER_ENDPOINT: &str = "transfer";
pub const ORDER_ENDPOINT: &str = "orderpending";
pub const FLAT_ENDPOINT: &str = "private";

pub const ASSETS_SELECT_ALL: u8 = 1;
pub const ACCOUNT_TYPE_SPOT: u8 = 0;
pub const ORDER_TYPE_LIMIT: u8 = 2;
pub const TRADE_INDEX: u32 = 1;
pub const LIST_PAGE: u32 = 1;
pub const LIST_PAGE_SIZE: u32 = 1000;

/// Batched-protocol side code
pub fn side_code(side: OrderSide) -> u8 {
    match side {
        OrderSide::Buy => 1,
        OrderSide::Sell => 2,
    }
}

pub fn side_from_code(code: i64) -> Option<OrderSide> {
    match code {
        1 => Some(OrderSide::Buy),
        2 => Some(OrderSide::Sell),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command<B = CommandBody> {
    pub cmd: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
    pub body: B,
}

impl Command {
    pub fn new(cmd: &str, body: impl Into<CommandBody>) -> Self {
        Self {
            cmd: cmd.to_string(),
            index: None,
            body: body.into(),
        }
    }

    pub fn indexed(cmd: &str, index: u32, body: impl Into<CommandBody>) -> Self {
        Self {
            index: Some(index),
            ..Self::new(cmd, body)
        }
    }
}

/// Serialize a single command as the one-element batch the exchange expects.
/// The returned string is exactly what gets signed and sent.
pub fn encode_batch<B: Serialize>(command: &Command<B>) -> Result<String, ExchangeError> {
    Ok(serde_json::to_string(&[command])?)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CommandBody {
    Assets(AssetsBody),
    Trade(TradeBody),
    OrderId(OrderIdBody),
    PendingList(PendingListBody),
    FlatTrade(FlatTradeBody),
    FlatOrder(FlatOrderBody),
    FlatPair(FlatPairBody),
    Empty(EmptyBody),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetsBody {
    pub select: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeBody {
    pub pair: String,
    pub account_type: u8,
    pub order_type: u8,
    pub order_side: u8,
    pub price: f64,
    pub amount: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderIdBody {
    pub id: i64,
}

impl OrderIdBody {
    /// Batched commands address orders by integer id
    pub fn parse(id: &str) -> Result<Self, ExchangeError> {
        id.trim()
            .parse::<i64>()
            .map(|id| Self { id })
            .map_err(|_| ExchangeError::Validation(format!("order id must be an integer: {}", id)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingListBody {
    pub account_type: u8,
    pub order_side: u8,
    pub page: u32,
    pub size: u32,
    pub coin_symbol: String,
    pub currency_symbol: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatTradeBody {
    pub currency_pair: String,
    #[serde(rename = "type")]
    pub side: OrderSide,
    pub rate: f64,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatOrderBody {
    pub currency_pair: String,
    pub order_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatPairBody {
    pub currency_pair: String,
}

/// Serializes as `{}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EmptyBody {}

macro_rules! impl_into_body {
    ($($body:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$body> for CommandBody {
                fn from(body: $body) -> Self {
                    Self::$variant(body)
                }
            }
        )*
    };
}

impl_into_body!(
    AssetsBody => Assets,
    TradeBody => Trade,
    OrderIdBody => OrderId,
    PendingListBody => PendingList,
    FlatTradeBody => FlatTrade,
    FlatOrderBody => FlatOrder,
    FlatPairBody => FlatPair,
    EmptyBody => Empty,
);

/// A command plus the endpoint it is posted to
#[derive(Debug, Clone, PartialEq)]
pub struct CommandRequest {
    pub endpoint: &'static str,
    pub command: Command,
}

impl CommandRequest {
    pub fn new(endpoint: &'static str, command: Command) -> Self {
        Self { endpoint, command }
    }

    pub fn encode(&self) -> Result<String, ExchangeError> {
        encode_batch(&self.command)
    }
}
