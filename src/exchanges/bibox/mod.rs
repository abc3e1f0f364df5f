pub mod commands;
pub mod conversions;
pub mod protocol;
pub mod settings;
pub mod signer;
pub mod types;

pub mod builder;
pub mod connector;
pub mod rest;

// Re-export main components
pub use builder::{build_connector, BiboxBuilder};
pub use commands::{Command, CommandBody, CommandRequest};
pub use connector::{Account, BiboxConnector, MarketData, Trading};
pub use protocol::{BatchedProtocol, FlatProtocol, Protocol, ProtocolVariant};
pub use settings::{BiboxSettings, MarketPair};
