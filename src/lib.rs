pub mod core;
pub mod exchanges;

pub use self::core::{
    config::ExchangeConfig,
    errors::{ErrorKind, ExchangeError},
    traits::{AccountInfo, ExchangeConnector, MarketDataSource, OrderPlacer},
    types::*,
};
pub use exchanges::bibox::{BiboxBuilder, BiboxConnector, ProtocolVariant};
