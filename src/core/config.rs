use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::env;

/// Credentials and caller identity, fixed at construction.
#[derive(Debug, Clone)]
pub struct ExchangeConfig {
    pub api_key: Secret<String>,
    pub secret_key: Secret<String>,
    pub base_url: Option<String>,
    /// Caller-assigned trader id, stamped on every journal entry
    pub trader_id: String,
    /// Exchange type tag (e.g. `bibox`)
    pub exchange_type: String,
    /// Display name of this exchange account
    pub exchange_name: String,
}

// Keys serialize as a placeholder so configs can be logged or dumped
impl Serialize for ExchangeConfig {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("ExchangeConfig", 6)?;
        state.serialize_field("api_key", "[REDACTED]")?;
        state.serialize_field("secret_key", "[REDACTED]")?;
        state.serialize_field("base_url", &self.base_url)?;
        state.serialize_field("trader_id", &self.trader_id)?;
        state.serialize_field("exchange_type", &self.exchange_type)?;
        state.serialize_field("exchange_name", &self.exchange_name)?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for ExchangeConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct ExchangeConfigHelper {
            api_key: String,
            secret_key: String,
            #[serde(default)]
            base_url: Option<String>,
            #[serde(default)]
            trader_id: String,
            #[serde(default = "default_exchange_type")]
            exchange_type: String,
            #[serde(default = "default_exchange_type")]
            exchange_name: String,
        }

        let helper = ExchangeConfigHelper::deserialize(deserializer)?;
        Ok(Self {
            api_key: Secret::new(helper.api_key),
            secret_key: Secret::new(helper.secret_key),
            base_url: helper.base_url,
            trader_id: helper.trader_id,
            exchange_type: helper.exchange_type,
            exchange_name: helper.exchange_name,
        })
    }
}

fn default_exchange_type() -> String {
    "bibox".to_string()
}

impl ExchangeConfig {
    /// Credentials with the default `bibox` identity and no trader id
    #[must_use]
    pub fn new(api_key: String, secret_key: String) -> Self {
        Self {
            api_key: Secret::new(api_key),
            secret_key: Secret::new(secret_key),
            base_url: None,
            trader_id: String::new(),
            exchange_type: default_exchange_type(),
            exchange_name: default_exchange_type(),
        }
    }

    /// Read `{PREFIX}_API_KEY` and `{PREFIX}_SECRET_KEY`, both required.
    ///
    /// Optional: `{PREFIX}_BASE_URL`, `{PREFIX}_TRADER_ID`,
    /// `{PREFIX}_EXCHANGE_TYPE` (defaults to the lower-cased prefix) and
    /// `{PREFIX}_EXCHANGE_NAME` (defaults to the type).
    pub fn from_env(exchange_prefix: &str) -> Result<Self, ConfigError> {
        let prefix = exchange_prefix.to_uppercase();
        let api_key_var = format!("{}_API_KEY", prefix);
        let secret_key_var = format!("{}_SECRET_KEY", prefix);

        let api_key = env::var(&api_key_var)
            .map_err(|_| ConfigError::MissingEnvironmentVariable(api_key_var))?;

        let secret_key = env::var(&secret_key_var)
            .map_err(|_| ConfigError::MissingEnvironmentVariable(secret_key_var))?;

        let base_url = env::var(format!("{}_BASE_URL", prefix)).ok();
        let trader_id = env::var(format!("{}_TRADER_ID", prefix)).unwrap_or_default();
        let exchange_type = env::var(format!("{}_EXCHANGE_TYPE", prefix))
            .unwrap_or_else(|_| exchange_prefix.to_lowercase());
        let exchange_name =
            env::var(format!("{}_EXCHANGE_NAME", prefix)).unwrap_or_else(|_| exchange_type.clone());

        Ok(Self {
            api_key: Secret::new(api_key),
            secret_key: Secret::new(secret_key),
            base_url,
            trader_id,
            exchange_type,
            exchange_name,
        })
    }

    /// Like `from_env`, after loading `./.env` if present
    #[cfg(feature = "env-file")]
    pub fn from_env_file(exchange_prefix: &str) -> Result<Self, ConfigError> {
        Self::from_env_file_with_path(exchange_prefix, ".env")
    }

    /// Like `from_env`, after loading the given dotenv file if present
    #[cfg(feature = "env-file")]
    pub fn from_env_file_with_path(
        exchange_prefix: &str,
        env_file_path: &str,
    ) -> Result<Self, ConfigError> {
        match dotenv::from_path(env_file_path) {
            Ok(_) => {}
            Err(dotenv::Error::Io(io_err)) if io_err.kind() == std::io::ErrorKind::NotFound => {
                // process environment only
            }
            Err(e) => {
                return Err(ConfigError::InvalidConfiguration(format!(
                    "cannot read dotenv file '{}': {}",
                    env_file_path, e
                )));
            }
        }

        Self::from_env(exchange_prefix)
    }

    /// Configuration for public market data only
    #[must_use]
    pub fn read_only() -> Self {
        Self::new(String::new(), String::new())
    }

    /// Both keys present; signed commands need this
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        !self.api_key.expose_secret().is_empty() && !self.secret_key.expose_secret().is_empty()
    }

    /// Override the signed-command host
    #[must_use]
    pub fn base_url(mut self, base_url: String) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// Set the trader id and exchange identity used in journal entries
    #[must_use]
    pub fn identity(
        mut self,
        trader_id: impl Into<String>,
        exchange_type: impl Into<String>,
        exchange_name: impl Into<String>,
    ) -> Self {
        self.trader_id = trader_id.into();
        self.exchange_type = exchange_type.into();
        self.exchange_name = exchange_name.into();
        self
    }

    /// Raw API key, sent as the `apikey` form field
    pub fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }

    /// Raw signing secret
    pub fn secret_key(&self) -> &str {
        self.secret_key.expose_secret()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvironmentVariable(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}
