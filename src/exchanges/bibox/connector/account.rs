use crate::core::errors::ExchangeError;
use crate::core::journal::TradeJournal;
use crate::core::kernel::RestClient;
use crate::core::traits::AccountInfo;
use crate::core::types::AccountBalances;
use crate::exchanges::bibox::rest::BiboxRest;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::instrument;

/// Bibox account implementation
pub struct Account<R: RestClient> {
    rest: BiboxRest<R>,
    journal: Arc<TradeJournal>,
}

impl<R: RestClient + Clone> Account<R> {
    pub fn new(rest: &BiboxRest<R>, journal: Arc<TradeJournal>) -> Self {
        Self {
            rest: rest.clone(),
            journal,
        }
    }
}

#[async_trait]
impl<R: RestClient> AccountInfo for Account<R> {
    #[instrument(skip(self), fields(exchange = "bibox"))]
    async fn get_account(&self) -> Result<AccountBalances, ExchangeError> {
        self.fetch_balances()
            .await
            .inspect_err(|e| self.journal.operation_failed("get_account", "", 0.0, 0.0, e))
    }
}

impl<R: RestClient> Account<R> {
    async fn fetch_balances(&self) -> Result<AccountBalances, ExchangeError> {
        let protocol = self.rest.protocol();
        let payload = self.rest.execute(&protocol.balances()).await?;

        // Decode into a fresh seeded map so a failure never leaks a partial one
        let seeded = AccountBalances::seeded(self.rest.settings().known_assets());
        protocol.decode_balances(payload, seeded)
    }
}
