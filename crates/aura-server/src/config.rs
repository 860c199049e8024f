use std::net::{Ipv4Addr, SocketAddr};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Shared secret expected in the `x-api-key` header on write endpoints.
    /// `None` disables authentication.
    pub api_key: Option<String>,
    /// Append the illustrative history after genesis at startup.
    pub seed_history: bool,
    /// Capacity of the in-process sensor reading channel.
    pub reading_buffer: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 9002)),
            api_key: None,
            seed_history: true,
            reading_buffer: 256,
        }
    }
}

impl ServerConfig {
    pub fn from_toml_str(source: &str) -> ServerResult<Self> {
        toml::from_str(source).map_err(|e| ServerError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> ServerResult<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }
}
