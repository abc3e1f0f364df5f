use crate::core::errors::ExchangeError;
use crate::core::kernel::{RateLimiter, RestClient};
use crate::exchanges::bibox::{
    commands::CommandRequest, conversions, protocol::Protocol, settings::BiboxSettings,
    signer::BiboxSigner,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{instrument, trace};

/// Bibox request pipeline: encode, sign, pace, send, unwrap.
///
/// Cloning is cheap; clones share the signer, limiter and settings.
pub struct BiboxRest<R: RestClient> {
    client: R,
    signer: Arc<BiboxSigner>,
    limiter: Arc<RateLimiter>,
    protocol: Arc<dyn Protocol>,
    settings: Arc<BiboxSettings>,
}

impl<R: RestClient + Clone> Clone for BiboxRest<R> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            signer: self.signer.clone(),
            limiter: self.limiter.clone(),
            protocol: self.protocol.clone(),
            settings: self.settings.clone(),
        }
    }
}

impl<R: RestClient> std::fmt::Debug for BiboxRest<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BiboxRest")
            .field("protocol", &self.protocol.variant())
            .field("limiter", &self.limiter)
            .finish_non_exhaustive()
    }
}

impl<R: RestClient> BiboxRest<R> {
    pub fn new(
        client: R,
        signer: Arc<BiboxSigner>,
        limiter: Arc<RateLimiter>,
        protocol: Arc<dyn Protocol>,
        settings: Arc<BiboxSettings>,
    ) -> Self {
        Self {
            client,
            signer,
            limiter,
            protocol,
            settings,
        }
    }

    pub fn protocol(&self) -> &dyn Protocol {
        self.protocol.as_ref()
    }

    pub fn settings(&self) -> &BiboxSettings {
        &self.settings
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Send one signed command and return its unwrapped payload
    #[instrument(skip(self, request), fields(exchange = "bibox", endpoint = request.endpoint, cmd = %request.command.cmd))]
    pub async fn execute(&self, request: &CommandRequest) -> Result<Value, ExchangeError> {
        let cmds = request.encode()?;
        let form = self.signer.sign_form(&cmds)?;
        let fields: Vec<(&str, &str)> = form
            .iter()
            .map(|(name, value)| (*name, value.as_str()))
            .collect();

        let slept = self.limiter.throttle().await;
        trace!(slept_ms = slept.as_millis() as u64, "sending {}", cmds);

        let raw = self.client.post_form(request.endpoint, &fields).await?;
        let response = conversions::parse_response(&raw)?;
        self.protocol.unwrap_payload(response)
    }

    /// Unsigned GET, paced only when the protocol routes it through the limiter
    #[instrument(skip(self), fields(exchange = "bibox"))]
    pub async fn get_public(&self, url: &str) -> Result<Value, ExchangeError> {
        if self.protocol.ticker_throttled() {
            self.limiter.throttle().await;
        }
        let raw = self.client.get(url).await?;
        conversions::parse_response(&raw)
    }
}
