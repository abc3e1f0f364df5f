use serde::{de, Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// Error object of a batched reply: `{"error":{"code":"3012","msg":"..."}}`
#[derive(Debug, Deserialize, Clone)]
pub struct BiboxError {
    #[serde(default)]
    pub code: Option<Value>,
    #[serde(default)]
    pub msg: String,
}

/// `transfer/assets` payload
#[derive(Debug, Deserialize, Clone)]
pub struct BiboxAssets {
    #[serde(default)]
    pub assets_list: Vec<BiboxAsset>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BiboxAsset {
    #[serde(alias = "coin")]
    pub coin_symbol: String,
    #[serde(deserialize_with = "de_f64")]
    pub balance: f64,
    #[serde(default, deserialize_with = "de_f64")]
    pub freeze: f64,
}

/// Order as returned by `orderpending/order` and the list commands
#[derive(Debug, Deserialize, Clone)]
pub struct BiboxOrder {
    #[serde(deserialize_with = "de_string")]
    pub id: String,
    #[serde(deserialize_with = "de_f64")]
    pub price: f64,
    #[serde(deserialize_with = "de_f64")]
    pub amount: f64,
    #[serde(default, deserialize_with = "de_f64")]
    pub deal_amount: f64,
    pub order_side: i64,
    #[serde(default)]
    pub pair: Option<String>,
    #[serde(default)]
    pub coin_symbol: Option<String>,
    #[serde(default)]
    pub currency_symbol: Option<String>,
}

/// Paged list payload of `orderPendingList` / `pendingHistoryList`
#[derive(Debug, Deserialize, Clone)]
pub struct BiboxOrderPage {
    #[serde(default)]
    pub items: Vec<BiboxOrder>,
}

/// Balances payload of the flat protocol
#[derive(Debug, Deserialize, Clone, Default)]
pub struct FlatBalances {
    #[serde(default, deserialize_with = "de_f64_map")]
    pub available: BTreeMap<String, f64>,
    #[serde(default, deserialize_with = "de_f64_map")]
    pub locked: BTreeMap<String, f64>,
}

/// Order object of the flat protocol
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FlatOrder {
    #[serde(deserialize_with = "de_string")]
    pub order_number: String,
    #[serde(deserialize_with = "de_f64")]
    pub rate: f64,
    #[serde(deserialize_with = "de_f64")]
    pub initial_amount: f64,
    #[serde(default, deserialize_with = "de_f64")]
    pub filled_amount: f64,
    #[serde(rename = "type")]
    pub side: String,
    #[serde(default)]
    pub currency_pair: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FlatOrderEnvelope {
    pub order: FlatOrder,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FlatOrderList {
    #[serde(default)]
    pub orders: Vec<FlatOrder>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FlatPlacedOrder {
    #[serde(deserialize_with = "de_string")]
    pub order_number: String,
}

/// One depth level, `[price, amount]`
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct DepthLevel(
    #[serde(deserialize_with = "de_f64")] pub f64,
    #[serde(deserialize_with = "de_f64")] pub f64,
);

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DepthSnapshot {
    #[serde(default)]
    pub bids: Vec<DepthLevel>,
    #[serde(default)]
    pub asks: Vec<DepthLevel>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    String(String),
}

impl NumberOrString {
    fn into_f64<E: de::Error>(self) -> Result<f64, E> {
        match self {
            Self::Number(n) => Ok(n),
            Self::String(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|e| E::custom(format!("invalid decimal {:?}: {}", s, e))),
        }
    }
}

/// Decimal sent either as a JSON number or as a numeric string
pub fn de_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    NumberOrString::deserialize(deserializer)?.into_f64()
}

pub fn de_f64_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    BTreeMap::<String, NumberOrString>::deserialize(deserializer)?
        .into_iter()
        .map(|(asset, value)| value.into_f64().map(|amount| (asset, amount)))
        .collect()
}

/// Identifier sent either as an integer or as a string
pub fn de_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Signed(i64),
        Unsigned(u64),
        Text(String),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Signed(n) => n.to_string(),
        Id::Unsigned(n) => n.to_string(),
        Id::Text(s) => s,
    })
}
