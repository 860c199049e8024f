use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    #[error("invalid payload: {0}")]
    InvalidPayload(#[from] aura_types::TypeError),

    #[error("malformed request body: {0}")]
    MalformedBody(String),

    #[error("ledger error: {0}")]
    Ledger(#[from] aura_ledger::LedgerError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::AuthFailed(_) => StatusCode::UNAUTHORIZED,
            Self::InvalidPayload(_) | Self::MalformedBody(_) => StatusCode::BAD_REQUEST,
            Self::Ledger(_) | Self::Config(_) | Self::Io(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub type ServerResult<T> = Result<T, ServerError>;
