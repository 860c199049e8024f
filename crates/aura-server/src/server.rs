use std::sync::Arc;

use aura_ledger::{Ledger, LedgerReader};
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;
use crate::state::AppState;

/// Aura ledger server. Owns the ledger for the lifetime of the process.
pub struct AuraServer {
    config: ServerConfig,
    state: AppState,
}

impl AuraServer {
    /// Build the ledger (genesis, plus history when `seed_history` is set)
    /// and the shared handler state.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let ledger = if config.seed_history {
            Ledger::seeded()?
        } else {
            Ledger::new()?
        };
        Ok(Self::with_ledger(config, Arc::new(ledger)))
    }

    /// Serve an existing ledger.
    pub fn with_ledger(config: ServerConfig, ledger: Arc<Ledger>) -> Self {
        let state = AppState::new(ledger, &config);
        Self { config, state }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.state.clone())
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let entries = self.state.ledger.entry_count()?;
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!(
            addr = %self.config.bind_addr,
            entries,
            auth = self.config.api_key.is_some(),
            "aura server listening"
        );
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}
