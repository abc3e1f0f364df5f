use crate::core::errors::ExchangeError;
use hmac::{Hmac, Mac};
use md5::Md5;
use secrecy::{ExposeSecret, Secret};

/// Produces the signature attached to an authenticated request.
///
/// Signing is a pure function of the payload and the key material, so the
/// same payload always yields the same signature.
pub trait Signer: Send + Sync {
    fn sign(&self, payload: &[u8]) -> Result<String, ExchangeError>;
}

/// HMAC-MD5 over the payload, hex encoded in lower case.
pub struct HmacMd5Signer {
    secret_key: Secret<String>,
}

impl HmacMd5Signer {
    pub fn new(secret_key: Secret<String>) -> Self {
        Self { secret_key }
    }
}

impl std::fmt::Debug for HmacMd5Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HmacMd5Signer").finish_non_exhaustive()
    }
}

impl Signer for HmacMd5Signer {
    fn sign(&self, payload: &[u8]) -> Result<String, ExchangeError> {
        let mut mac = Hmac::<Md5>::new_from_slice(self.secret_key.expose_secret().as_bytes())
            .map_err(|e| ExchangeError::AuthError(format!("Invalid secret key: {}", e)))?;

        mac.update(payload);
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}
