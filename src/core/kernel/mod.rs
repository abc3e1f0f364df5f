/// Exchange-agnostic plumbing shared by connectors.
///
/// - `RestClient`: byte-level HTTP transport (`ReqwestRest` in production)
/// - `Signer`: request authentication (`HmacMd5Signer`)
/// - `RateLimiter`: cooperative pacing with an injectable `Clock`
///
/// Nothing in here knows about a particular exchange's commands or response
/// shapes; that lives under `exchanges`.
///
/// ```rust,no_run
/// use bibox_connector::core::kernel::*;
/// use secrecy::Secret;
///
/// # async fn example() -> Result<(), bibox_connector::core::errors::ExchangeError> {
/// let rest = RestClientBuilder::new(RestClientConfig::new(
///     "https://api.bibox365.com/v1/".to_string(),
///     "bibox".to_string(),
/// ))
/// .build()?;
/// let signer = HmacMd5Signer::new(Secret::new("secret".to_string()));
/// let limiter = RateLimiter::with_monotonic_clock(10.0);
///
/// let cmds = r#"[{"cmd":"transfer/assets","body":{"select":1}}]"#;
/// let sign = signer.sign(cmds.as_bytes())?;
/// limiter.throttle().await;
/// let _raw = rest
///     .post_form("transfer", &[("cmds", cmds), ("apikey", "key"), ("sign", sign.as_str())])
///     .await?;
/// # Ok(())
/// # }
/// ```
pub mod limiter;
pub mod rest;
pub mod signer;

pub use limiter::{Clock, MonotonicClock, RateLimiter};
pub use rest::{ReqwestRest, RestClient, RestClientBuilder, RestClientConfig};
pub use signer::{HmacMd5Signer, Signer};
