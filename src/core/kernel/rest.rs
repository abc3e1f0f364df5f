use crate::core::errors::ExchangeError;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use std::time::Duration;
use tracing::{instrument, trace};

/// HTTP transport used by exchange clients.
///
/// Implementations only move bytes: signing, pacing and response
/// interpretation belong to the exchange layer. A non-2xx status is an error
/// carrying the body; any 2xx body is returned verbatim.
#[async_trait]
pub trait RestClient: Send + Sync {
    /// POST `application/x-www-form-urlencoded` fields to `endpoint`
    ///
    /// # Arguments
    /// * `endpoint` - Path relative to the base URL, or an absolute URL
    /// * `form` - Form fields, sent in the given order
    async fn post_form(
        &self,
        endpoint: &str,
        form: &[(&str, &str)],
    ) -> Result<Vec<u8>, ExchangeError>;

    /// GET `endpoint` (relative to the base URL, or absolute)
    async fn get(&self, endpoint: &str) -> Result<Vec<u8>, ExchangeError>;
}

/// Transport settings; one per host
#[derive(Clone, Debug)]
pub struct RestClientConfig {
    /// Prefix for relative endpoints, with trailing slash
    pub base_url: String,
    /// Span field on every request
    pub exchange_name: String,
    /// Whole-request timeout, seconds
    pub timeout_seconds: u64,
    pub user_agent: String,
}

impl RestClientConfig {
    pub fn new(base_url: String, exchange_name: String) -> Self {
        Self {
            base_url,
            exchange_name,
            timeout_seconds: 30,
            user_agent: "bibox-connector/0.1".to_string(),
        }
    }

    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = user_agent;
        self
    }
}

pub struct RestClientBuilder {
    config: RestClientConfig,
}

impl RestClientBuilder {
    pub fn new(config: RestClientConfig) -> Self {
        Self { config }
    }

    pub fn build(self) -> Result<ReqwestRest, ExchangeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(self.config.timeout_seconds))
            .user_agent(&self.config.user_agent)
            .build()
            .map_err(|e| ExchangeError::NetworkError(format!("cannot build HTTP client: {}", e)))?;

        Ok(ReqwestRest {
            client,
            config: self.config,
        })
    }
}

/// reqwest-backed transport
#[derive(Clone, Debug)]
pub struct ReqwestRest {
    client: Client,
    config: RestClientConfig,
}

impl ReqwestRest {
    pub fn new(base_url: String, exchange_name: String) -> Result<Self, ExchangeError> {
        RestClientBuilder::new(RestClientConfig::new(base_url, exchange_name)).build()
    }

    pub fn config(&self) -> &RestClientConfig {
        &self.config
    }

    /// Build the full URL for an endpoint; absolute URLs pass through untouched
    pub(crate) fn build_url(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint.to_string()
        } else {
            format!("{}{}", self.config.base_url, endpoint)
        }
    }

    #[instrument(skip(self, request), fields(exchange = %self.config.exchange_name))]
    async fn send(&self, request: RequestBuilder) -> Result<Vec<u8>, ExchangeError> {
        let response = request
            .send()
            .await
            .map_err(|e| {
                ExchangeError::NetworkError(format!(
                    "request to {} failed: {}",
                    self.config.exchange_name, e
                ))
            })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            ExchangeError::NetworkError(format!("response body unreadable: {}", e))
        })?;

        trace!(status = status.as_u16(), "body: {}", String::from_utf8_lossy(&body));

        if status.is_success() {
            Ok(body.to_vec())
        } else {
            Err(ExchangeError::HttpStatus {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            })
        }
    }
}

#[async_trait]
impl RestClient for ReqwestRest {
    #[instrument(skip(self, form), fields(exchange = %self.config.exchange_name, endpoint = %endpoint, field_count = form.len()))]
    async fn post_form(
        &self,
        endpoint: &str,
        form: &[(&str, &str)],
    ) -> Result<Vec<u8>, ExchangeError> {
        let url = self.build_url(endpoint);
        self.send(self.client.post(url).form(form)).await
    }

    #[instrument(skip(self), fields(exchange = %self.config.exchange_name, endpoint = %endpoint))]
    async fn get(&self, endpoint: &str) -> Result<Vec<u8>, ExchangeError> {
        let url = self.build_url(endpoint);
        self.send(self.client.get(url)).await
    }
}
