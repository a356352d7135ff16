//! Domain-specific error types for ask-relay

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::clients::ProviderError;
use crate::prompt::ErrorBody;

/// Message returned for every upstream failure. Provider detail stays in the server log.
pub const GENERIC_FAILURE_MESSAGE: &str =
    "Ocorreu um erro ao processar sua pergunta. Verifique o console do servidor para mais detalhes.";

/// Main error type for the relay service
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Provider error: {0}")]
    Upstream(#[from] ProviderError),
}

impl RelayError {
    pub fn config(message: impl Into<String>) -> Self {
        RelayError::Config {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        RelayError::Validation {
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::Validation { .. } => StatusCode::BAD_REQUEST,
            RelayError::Config { .. } | RelayError::Upstream(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Convert RelayError to an HTTP response
impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = match self {
            RelayError::Validation { message } => {
                tracing::debug!("Rejected question: {}", message);
                message
            }
            RelayError::Upstream(err) => {
                tracing::error!(error = %err, "Provider call failed");
                GENERIC_FAILURE_MESSAGE.to_string()
            }
            RelayError::Config { message } => {
                tracing::error!("Configuration error while serving request: {}", message);
                GENERIC_FAILURE_MESSAGE.to_string()
            }
        };
        (status, Json(ErrorBody { error })).into_response()
    }
}

/// Result type alias for relay operations
pub type Result<T> = std::result::Result<T, RelayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upstream_detail_is_not_exposed() {
        let err = RelayError::from(ProviderError::Status {
            status: 429,
            body: "quota exceeded for key AIza-secret".to_string(),
        });
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let raw = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(!raw.contains("AIza-secret"));
        assert!(!raw.contains("429"));
        let body: ErrorBody = serde_json::from_str(&raw).unwrap();
        assert_eq!(body.error, GENERIC_FAILURE_MESSAGE);
    }

    #[test]
    fn validation_maps_to_bad_request() {
        assert_eq!(
            RelayError::validation("empty").status(),
            StatusCode::BAD_REQUEST
        );
    }
}
