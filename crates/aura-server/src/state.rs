use std::sync::Arc;

use aura_ledger::Ledger;
use aura_types::{SensorReading, Timestamp};
use serde::Serialize;
use tokio::sync::broadcast;

use crate::auth::{AllowAllAuth, AuthProvider, SharedSecretAuth};
use crate::config::ServerConfig;

/// A sensor reading accepted by the ingestion endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingNotice {
    #[serde(flatten)]
    pub reading: SensorReading,
    pub received_at: Timestamp,
}

/// Shared handler state. Cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<Ledger>,
    pub auth: Arc<dyn AuthProvider>,
    pub readings: broadcast::Sender<ReadingNotice>,
}

impl AppState {
    pub fn new(ledger: Arc<Ledger>, config: &ServerConfig) -> Self {
        let auth: Arc<dyn AuthProvider> = match &config.api_key {
            Some(key) => Arc::new(SharedSecretAuth::new(key.clone())),
            None => Arc::new(AllowAllAuth),
        };
        let (readings, _) = broadcast::channel(config.reading_buffer.max(1));
        Self {
            ledger,
            auth,
            readings,
        }
    }

    /// Subscribe to readings accepted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ReadingNotice> {
        self.readings.subscribe()
    }
}
