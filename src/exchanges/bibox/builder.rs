use crate::core::config::ExchangeConfig;
use crate::core::errors::ExchangeError;
use crate::core::journal::{JournalEntry, TradeJournal};
use crate::core::kernel::{
    Clock, MonotonicClock, RateLimiter, ReqwestRest, RestClient, RestClientBuilder,
    RestClientConfig,
};
use crate::exchanges::bibox::{
    connector::BiboxConnector, protocol::ProtocolVariant, rest::BiboxRest,
    settings::BiboxSettings, signer::BiboxSigner,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::warn;

/// Builder for creating Bibox exchange connectors
///
/// The protocol variant, hosts and initial rate are fixed here; a built
/// connector never switches schema.
pub struct BiboxBuilder {
    config: ExchangeConfig,
    variant: ProtocolVariant,
    settings: BiboxSettings,
    rate_limit: Option<f64>,
    rest_timeout: u64,
    clock: Option<Arc<dyn Clock>>,
    journal_sink: Option<mpsc::UnboundedSender<JournalEntry>>,
}

impl Default for BiboxBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BiboxBuilder {
    pub fn new() -> Self {
        Self {
            config: ExchangeConfig::read_only(),
            variant: ProtocolVariant::default(),
            settings: BiboxSettings::default(),
            rate_limit: None,
            rest_timeout: 30,
            clock: None,
            journal_sink: None,
        }
    }

    /// Set the exchange configuration
    pub fn with_config(mut self, config: ExchangeConfig) -> Self {
        self.config = config;
        self
    }

    /// Set API credentials, keeping the rest of the configuration
    pub fn with_credentials(mut self, api_key: String, secret_key: String) -> Self {
        let previous = std::mem::replace(
            &mut self.config,
            ExchangeConfig::new(api_key, secret_key),
        );
        self.config.base_url = previous.base_url;
        self.config.trader_id = previous.trader_id;
        self.config.exchange_type = previous.exchange_type;
        self.config.exchange_name = previous.exchange_name;
        self
    }

    pub fn with_variant(mut self, variant: ProtocolVariant) -> Self {
        self.variant = variant;
        self
    }

    /// Set base URL for signed requests
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.config.base_url = Some(base_url);
        self
    }

    /// Set the public market-data host used by the batched protocol
    pub fn with_market_data_url(mut self, url: String) -> Self {
        self.settings.market_data_host = url;
        self
    }

    /// Replace the market and period tables
    pub fn with_settings(mut self, settings: BiboxSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Initial calls-per-second ceiling
    pub fn with_rate_limit(mut self, rate: f64) -> Self {
        self.rate_limit = Some(rate);
        self
    }

    /// Set REST client timeout in seconds
    pub fn with_rest_timeout(mut self, timeout: u64) -> Self {
        self.rest_timeout = timeout;
        self
    }

    /// Clock driving the rate limiter
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Forward every journal entry to this channel as well as to `tracing`
    pub fn with_journal_sink(mut self, sink: mpsc::UnboundedSender<JournalEntry>) -> Self {
        self.journal_sink = Some(sink);
        self
    }

    /// Build a connector over reqwest
    pub fn build(mut self) -> Result<BiboxConnector<ReqwestRest>, ExchangeError> {
        if let Some(base_url) = self.config.base_url.clone() {
            self.settings.host = base_url;
        }

        let rest_config = RestClientConfig::new(self.settings.host.clone(), "bibox".to_string())
            .with_timeout(self.rest_timeout);
        let client = RestClientBuilder::new(rest_config).build()?;

        Ok(self.build_with_client(client))
    }

    /// Build a connector over any transport
    pub fn build_with_client<R: RestClient + Clone>(self, client: R) -> BiboxConnector<R> {
        if !self.config.has_credentials() {
            warn!("no Bibox credentials configured, signed requests will be rejected");
        }

        let rate = self.rate_limit.unwrap_or(self.settings.default_rate);
        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(MonotonicClock::new()));
        let limiter = Arc::new(RateLimiter::new(rate, clock));

        let signer = Arc::new(BiboxSigner::new(
            self.config.api_key.clone(),
            self.config.secret_key.clone(),
        ));

        let mut journal = TradeJournal::new(
            self.config.trader_id.clone(),
            self.config.exchange_type.clone(),
        );
        if let Some(sink) = self.journal_sink {
            journal = journal.with_sink(sink);
        }

        let rest = BiboxRest::new(
            client,
            signer,
            limiter,
            self.variant.protocol(),
            Arc::new(self.settings),
        );

        BiboxConnector::new(
            rest,
            Arc::new(journal),
            self.config.exchange_type,
            self.config.exchange_name,
        )
    }
}

/// Create a Bibox connector with the default (batched) protocol
pub fn build_connector(
    config: ExchangeConfig,
) -> Result<BiboxConnector<ReqwestRest>, ExchangeError> {
    BiboxBuilder::new().with_config(config).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::traits::ExchangeConnector;

    #[test]
    fn test_build_defaults() {
        let connector = BiboxBuilder::new().build().unwrap();

        assert_eq!(connector.protocol_variant(), ProtocolVariant::Batched);
        assert_eq!(connector.limit(), 10.0);
        assert_eq!(connector.get_type(), "bibox");
        assert_eq!(connector.get_min_amount("eth/usdt"), Some(0.001));
    }

    #[test]
    fn test_credentials_keep_identity() {
        let config = ExchangeConfig::read_only().identity("trader-9", "bibox", "bibox-sub");
        let connector = BiboxBuilder::new()
            .with_config(config)
            .with_credentials("key".to_string(), "secret".to_string())
            .with_variant(ProtocolVariant::Flat)
            .with_rate_limit(4.0)
            .build()
            .unwrap();

        assert_eq!(connector.get_name(), "bibox-sub");
        assert_eq!(connector.protocol_variant(), ProtocolVariant::Flat);
        assert_eq!(connector.limit(), 4.0);
        assert_eq!(connector.set_limit(2.5), 2.5);
        assert_eq!(connector.limit(), 2.5);
    }
}
