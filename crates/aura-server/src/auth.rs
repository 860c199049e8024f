use async_trait::async_trait;
use axum::http::HeaderMap;

use crate::error::{ServerError, ServerResult};

/// Header carrying the shared secret.
pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Credentials {
    ApiKey(String),
    Anonymous,
}

impl Credentials {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(API_KEY_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(|key| Self::ApiKey(key.to_string()))
            .unwrap_or(Self::Anonymous)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Identity {
    Device,
    Anonymous,
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn authenticate(&self, credentials: &Credentials) -> ServerResult<Identity>;
}

/// Accepts every request. Used when no API key is configured.
pub struct AllowAllAuth;

#[async_trait]
impl AuthProvider for AllowAllAuth {
    async fn authenticate(&self, credentials: &Credentials) -> ServerResult<Identity> {
        match credentials {
            Credentials::ApiKey(_) => Ok(Identity::Device),
            Credentials::Anonymous => Ok(Identity::Anonymous),
        }
    }
}

/// Requires the configured shared secret in the `x-api-key` header.
pub struct SharedSecretAuth {
    key: String,
}

impl SharedSecretAuth {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

#[async_trait]
impl AuthProvider for SharedSecretAuth {
    async fn authenticate(&self, credentials: &Credentials) -> ServerResult<Identity> {
        match credentials {
            Credentials::ApiKey(key) if constant_time_eq(key.as_bytes(), self.key.as_bytes()) => {
                Ok(Identity::Device)
            }
            Credentials::ApiKey(_) => Err(ServerError::AuthFailed("invalid api key".into())),
            Credentials::Anonymous => Err(ServerError::AuthFailed("missing api key".into())),
        }
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
