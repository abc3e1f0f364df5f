use crate::core::errors::ExchangeError;
use crate::core::kernel::{HmacMd5Signer, Signer};
use secrecy::{ExposeSecret, Secret};

/// Signs command batches into the `cmds` / `apikey` / `sign` form.
pub struct BiboxSigner {
    api_key: Secret<String>,
    inner: HmacMd5Signer,
}

impl BiboxSigner {
    pub fn new(api_key: Secret<String>, secret_key: Secret<String>) -> Self {
        Self {
            api_key,
            inner: HmacMd5Signer::new(secret_key),
        }
    }

    /// `cmds` must be the exact serialized batch that will be sent
    pub fn sign_form(&self, cmds: &str) -> Result<Vec<(&'static str, String)>, ExchangeError> {
        let sign = self.inner.sign(cmds.as_bytes())?;
        Ok(vec![
            ("cmds", cmds.to_string()),
            ("apikey", self.api_key.expose_secret().clone()),
            ("sign", sign),
        ])
    }
}

impl std::fmt::Debug for BiboxSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BiboxSigner").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_fields_in_wire_order() {
        let signer = BiboxSigner::new(
            Secret::new("my-key".to_string()),
            Secret::new("my-secret".to_string()),
        );
        let cmds = r#"[{"cmd":"transfer/assets","body":{"select":1}}]"#;
        let form = signer.sign_form(cmds).unwrap();

        let names: Vec<_> = form.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, ["cmds", "apikey", "sign"]);
        assert_eq!(form[0].1, cmds);
        assert_eq!(form[1].1, "my-key");

        let expected = HmacMd5Signer::new(Secret::new("my-secret".to_string()))
            .sign(cmds.as_bytes())
            .unwrap();
        assert_eq!(form[2].1, expected);
    }

    #[test]
    fn test_debug_hides_keys() {
        let signer = BiboxSigner::new(
            Secret::new("my-key".to_string()),
            Secret::new("my-secret".to_string()),
        );
        let debug = format!("{:?}", signer);
        assert!(!debug.contains("my-key"));
        assert!(!debug.contains("my-secret"));
    }
}
