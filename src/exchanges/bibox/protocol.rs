//! The two Bibox command/response schemas behind one interface.
//!
//! A connector picks its `Protocol` once, at build time. Every encoding that
//! differs between the schemas (side codes vs side strings, pagination,
//! response unwrapping, depth ordering) is answered by that one object, so a
//! connector can never mix the two.

use super::commands::{
    side_code, AssetsBody, Command, CommandRequest, EmptyBody, FlatOrderBody, FlatPairBody,
    FlatTradeBody, OrderIdBody, PendingListBody, TradeBody, ACCOUNT_TYPE_SPOT, ASSETS_SELECT_ALL,
    FLAT_ENDPOINT, LIST_PAGE, LIST_PAGE_SIZE, ORDER_ENDPOINT, ORDER_TYPE_LIMIT, TRADE_INDEX,
    TRANSFER_ENDPOINT,
};
use super::conversions;
use super::settings::{BiboxSettings, MarketPair};
use super::types::{
    BiboxAssets, BiboxOrder, BiboxOrderPage, DepthSnapshot, FlatBalances, FlatOrderEnvelope,
    FlatOrderList, FlatPlacedOrder,
};
use crate::core::errors::ExchangeError;
use crate::core::types::{AccountBalances, Order, OrderSide};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProtocolVariant {
    /// `cmds` batches with integer side codes and `result[0].result` replies
    #[default]
    Batched,
    /// String sides, no pagination, `result: "true"` success flag
    Flat,
}

impl ProtocolVariant {
    pub fn protocol(self) -> Arc<dyn Protocol> {
        match self {
            Self::Batched => Arc::new(BatchedProtocol),
            Self::Flat => Arc::new(FlatProtocol),
        }
    }
}

impl fmt::Display for ProtocolVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Batched => f.write_str("batched"),
            Self::Flat => f.write_str("flat"),
        }
    }
}

pub trait Protocol: Send + Sync + fmt::Debug {
    fn variant(&self) -> ProtocolVariant;

    fn balances(&self) -> CommandRequest;

    fn place_order(
        &self,
        market: &MarketPair,
        side: OrderSide,
        price: f64,
        amount: f64,
    ) -> CommandRequest;

    fn get_order(&self, market: &MarketPair, id: &str) -> Result<CommandRequest, ExchangeError>;

    /// Requests whose results, concatenated, are the open orders (buy side first)
    fn open_orders(&self, market: &MarketPair) -> Vec<CommandRequest>;

    /// Empty when the schema has no history command
    fn trade_history(&self, market: &MarketPair) -> Vec<CommandRequest>;

    fn cancel_order(&self, market: &MarketPair, id: &str)
        -> Result<CommandRequest, ExchangeError>;

    /// Extract the payload of a signed reply, or the rejection it carries
    fn unwrap_payload(&self, response: Value) -> Result<Value, ExchangeError>;

    fn decode_balances(
        &self,
        payload: Value,
        seeded: AccountBalances,
    ) -> Result<AccountBalances, ExchangeError>;

    fn decode_order_id(&self, payload: Value) -> Result<String, ExchangeError>;

    fn decode_order(
        &self,
        payload: Value,
        settings: &BiboxSettings,
        market: &MarketPair,
    ) -> Result<Order, ExchangeError>;

    fn decode_orders(
        &self,
        payload: Value,
        settings: &BiboxSettings,
        market: &MarketPair,
    ) -> Result<Vec<Order>, ExchangeError>;

    /// Message the exchange attached to a successful cancel
    fn decode_cancel(&self, payload: Value) -> String;

    /// Endpoint of the public depth query, absolute or relative to the host
    fn ticker_url(&self, settings: &BiboxSettings, market: &MarketPair) -> String;

    /// Whether the public depth query counts against the rate limit
    fn ticker_throttled(&self) -> bool;

    fn decode_depth(&self, response: Value) -> Result<DepthSnapshot, ExchangeError>;

    /// Whether the feed lists asks far-to-near
    fn asks_descending(&self) -> bool;
}

fn message_of(payload: &Value) -> String {
    payload
        .as_str()
        .map_or_else(|| payload.to_string(), str::to_string)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BatchedProtocol;

impl BatchedProtocol {
    fn pending_list(cmd: &str, market: &MarketPair, side: OrderSide) -> CommandRequest {
        CommandRequest::new(
            ORDER_ENDPOINT,
            Command::new(
                cmd,
                PendingListBody {
                    account_type: ACCOUNT_TYPE_SPOT,
                    order_side: side_code(side),
                    page: LIST_PAGE,
                    size: LIST_PAGE_SIZE,
                    coin_symbol: market.base().to_string(),
                    currency_symbol: market.quote().to_string(),
                },
            ),
        )
    }
}

impl Protocol for BatchedProtocol {
    fn variant(&self) -> ProtocolVariant {
        ProtocolVariant::Batched
    }

    fn balances(&self) -> CommandRequest {
        CommandRequest::new(
            TRANSFER_ENDPOINT,
            Command::new(
                "transfer/assets",
                AssetsBody {
                    select: ASSETS_SELECT_ALL,
                },
            ),
        )
    }

    fn place_order(
        &self,
        market: &MarketPair,
        side: OrderSide,
        price: f64,
        amount: f64,
    ) -> CommandRequest {
        CommandRequest::new(
            ORDER_ENDPOINT,
            Command::indexed(
                "orderpending/trade",
                TRADE_INDEX,
                TradeBody {
                    pair: market.native.clone(),
                    account_type: ACCOUNT_TYPE_SPOT,
                    order_type: ORDER_TYPE_LIMIT,
                    order_side: side_code(side),
                    price,
                    amount,
                },
            ),
        )
    }

    fn get_order(&self, _market: &MarketPair, id: &str) -> Result<CommandRequest, ExchangeError> {
        Ok(CommandRequest::new(
            ORDER_ENDPOINT,
            Command::new("orderpending/order", OrderIdBody::parse(id)?),
        ))
    }

    fn open_orders(&self, market: &MarketPair) -> Vec<CommandRequest> {
        [OrderSide::Buy, OrderSide::Sell]
            .into_iter()
            .map(|side| Self::pending_list("orderpending/orderPendingList", market, side))
            .collect()
    }

    fn trade_history(&self, market: &MarketPair) -> Vec<CommandRequest> {
        [OrderSide::Buy, OrderSide::Sell]
            .into_iter()
            .map(|side| Self::pending_list("orderpending/pendingHistoryList", market, side))
            .collect()
    }

    fn cancel_order(
        &self,
        _market: &MarketPair,
        id: &str,
    ) -> Result<CommandRequest, ExchangeError> {
        Ok(CommandRequest::new(
            ORDER_ENDPOINT,
            Command::indexed("orderpending/cancelTrade", TRADE_INDEX, OrderIdBody::parse(id)?),
        ))
    }

    fn unwrap_payload(&self, response: Value) -> Result<Value, ExchangeError> {
        conversions::batched_payload(response)
    }

    fn decode_balances(
        &self,
        payload: Value,
        seeded: AccountBalances,
    ) -> Result<AccountBalances, ExchangeError> {
        let assets: BiboxAssets = serde_json::from_value(payload)?;
        Ok(conversions::balances_from_assets(assets, seeded))
    }

    fn decode_order_id(&self, payload: Value) -> Result<String, ExchangeError> {
        match payload {
            Value::Number(id) => Ok(id.to_string()),
            Value::String(id) if !id.is_empty() => Ok(id),
            other => Err(ExchangeError::InvalidResponseFormat(format!(
                "expected an order id, got {}",
                other
            ))),
        }
    }

    fn decode_order(
        &self,
        payload: Value,
        settings: &BiboxSettings,
        market: &MarketPair,
    ) -> Result<Order, ExchangeError> {
        let order: BiboxOrder = serde_json::from_value(payload)?;
        conversions::order_from_bibox(order, settings, market)
    }

    fn decode_orders(
        &self,
        payload: Value,
        settings: &BiboxSettings,
        market: &MarketPair,
    ) -> Result<Vec<Order>, ExchangeError> {
        let page: BiboxOrderPage = serde_json::from_value(payload)?;
        page.items
            .into_iter()
            .map(|order| conversions::order_from_bibox(order, settings, market))
            .collect()
    }

    fn decode_cancel(&self, payload: Value) -> String {
        message_of(&payload)
    }

    fn ticker_url(&self, settings: &BiboxSettings, market: &MarketPair) -> String {
        format!("{}orderBook/{}", settings.market_data_host, market.native)
    }

    fn ticker_throttled(&self) -> bool {
        false
    }

    fn decode_depth(&self, response: Value) -> Result<DepthSnapshot, ExchangeError> {
        conversions::batched_depth(response)
    }

    fn asks_descending(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FlatProtocol;

impl FlatProtocol {
    fn order_body(market: &MarketPair, id: &str) -> Result<FlatOrderBody, ExchangeError> {
        let order_number = id.trim();
        if order_number.is_empty() {
            return Err(ExchangeError::Validation("order id is empty".to_string()));
        }
        Ok(FlatOrderBody {
            currency_pair: market.native.clone(),
            order_number: order_number.to_string(),
        })
    }
}

impl Protocol for FlatProtocol {
    fn variant(&self) -> ProtocolVariant {
        ProtocolVariant::Flat
    }

    fn balances(&self) -> CommandRequest {
        CommandRequest::new(FLAT_ENDPOINT, Command::new("private/balances", EmptyBody {}))
    }

    fn place_order(
        &self,
        market: &MarketPair,
        side: OrderSide,
        price: f64,
        amount: f64,
    ) -> CommandRequest {
        CommandRequest::new(
            FLAT_ENDPOINT,
            Command::new(
                "private/trade",
                FlatTradeBody {
                    currency_pair: market.native.clone(),
                    side,
                    rate: price,
                    amount,
                },
            ),
        )
    }

    fn get_order(&self, market: &MarketPair, id: &str) -> Result<CommandRequest, ExchangeError> {
        Ok(CommandRequest::new(
            FLAT_ENDPOINT,
            Command::new("private/getOrder", Self::order_body(market, id)?),
        ))
    }

    fn open_orders(&self, market: &MarketPair) -> Vec<CommandRequest> {
        vec![CommandRequest::new(
            FLAT_ENDPOINT,
            Command::new(
                "private/openOrders",
                FlatPairBody {
                    currency_pair: market.native.clone(),
                },
            ),
        )]
    }

    fn trade_history(&self, _market: &MarketPair) -> Vec<CommandRequest> {
        Vec::new()
    }

    fn cancel_order(
        &self,
        market: &MarketPair,
        id: &str,
    ) -> Result<CommandRequest, ExchangeError> {
        Ok(CommandRequest::new(
            FLAT_ENDPOINT,
            Command::new("private/cancelOrder", Self::order_body(market, id)?),
        ))
    }

    fn unwrap_payload(&self, response: Value) -> Result<Value, ExchangeError> {
        conversions::flat_payload(response)
    }

    fn decode_balances(
        &self,
        payload: Value,
        seeded: AccountBalances,
    ) -> Result<AccountBalances, ExchangeError> {
        let balances: FlatBalances = serde_json::from_value(payload)?;
        Ok(conversions::balances_from_flat(balances, seeded))
    }

    fn decode_order_id(&self, payload: Value) -> Result<String, ExchangeError> {
        let placed: FlatPlacedOrder = serde_json::from_value(payload)?;
        Ok(placed.order_number)
    }

    fn decode_order(
        &self,
        payload: Value,
        settings: &BiboxSettings,
        market: &MarketPair,
    ) -> Result<Order, ExchangeError> {
        let envelope: FlatOrderEnvelope = serde_json::from_value(payload)?;
        conversions::order_from_flat(envelope.order, settings, market)
    }

    fn decode_orders(
        &self,
        payload: Value,
        settings: &BiboxSettings,
        market: &MarketPair,
    ) -> Result<Vec<Order>, ExchangeError> {
        let list: FlatOrderList = serde_json::from_value(payload)?;
        list.orders
            .into_iter()
            .map(|order| conversions::order_from_flat(order, settings, market))
            .collect()
    }

    fn decode_cancel(&self, payload: Value) -> String {
        payload
            .get("message")
            .map_or_else(|| "cancelled".to_string(), message_of)
    }

    fn ticker_url(&self, _settings: &BiboxSettings, market: &MarketPair) -> String {
        format!("orderBook/{}", market.native)
    }

    fn ticker_throttled(&self) -> bool {
        true
    }

    fn decode_depth(&self, response: Value) -> Result<DepthSnapshot, ExchangeError> {
        conversions::flat_depth(response)
    }

    fn asks_descending(&self) -> bool {
        true
    }
}
