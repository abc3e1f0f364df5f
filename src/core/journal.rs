//! Trade journal: the structured log every connector operation reports to.
//!
//! Entries are emitted as `tracing` events and, when a sink is attached,
//! forwarded over a channel so callers (and tests) can observe them.

use crate::core::errors::ExchangeError;
use std::fmt;
use tokio::sync::mpsc;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JournalKind {
    Info,
    Error,
    Buy,
    Sell,
    Cancel,
}

impl fmt::Display for JournalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Self::Info => "INFO",
            Self::Error => "ERROR",
            Self::Buy => "BUY",
            Self::Sell => "SELL",
            Self::Cancel => "CANCEL",
        };
        f.write_str(tag)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JournalEntry {
    pub kind: JournalKind,
    pub trader_id: String,
    pub exchange_type: String,
    pub symbol: String,
    pub price: f64,
    pub amount: f64,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct TradeJournal {
    trader_id: String,
    exchange_type: String,
    sink: Option<mpsc::UnboundedSender<JournalEntry>>,
}

impl TradeJournal {
    pub fn new(trader_id: impl Into<String>, exchange_type: impl Into<String>) -> Self {
        Self {
            trader_id: trader_id.into(),
            exchange_type: exchange_type.into(),
            sink: None,
        }
    }

    pub fn with_sink(mut self, sink: mpsc::UnboundedSender<JournalEntry>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn log(&self, kind: JournalKind, symbol: &str, price: f64, amount: f64, message: &str) {
        match kind {
            JournalKind::Error => error!(
                trader_id = %self.trader_id,
                exchange = %self.exchange_type,
                kind = %kind,
                symbol,
                price,
                amount,
                "{}",
                message
            ),
            _ => info!(
                trader_id = %self.trader_id,
                exchange = %self.exchange_type,
                kind = %kind,
                symbol,
                price,
                amount,
                "{}",
                message
            ),
        }

        if let Some(sink) = &self.sink {
            // A dropped receiver just means nobody is listening any more.
            let _ = sink.send(JournalEntry {
                kind,
                trader_id: self.trader_id.clone(),
                exchange_type: self.exchange_type.clone(),
                symbol: symbol.to_string(),
                price,
                amount,
                message: message.to_string(),
            });
        }
    }

    pub fn info(&self, message: &str) {
        self.log(JournalKind::Info, "", 0.0, 0.0, message);
    }

    /// Record a failed operation with whatever context the caller has.
    pub fn operation_failed(
        &self,
        operation: &str,
        symbol: &str,
        price: f64,
        amount: f64,
        err: &ExchangeError,
    ) {
        self.log(
            JournalKind::Error,
            symbol,
            price,
            amount,
            &format!("{}() error ({:?}), {}", operation, err.kind(), err),
        );
    }
}
