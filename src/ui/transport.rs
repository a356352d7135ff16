use async_trait::async_trait;
use serde_json::Value;

use crate::prompt::AskRequest;
use crate::ui::{RelayTransport, TransportError};

pub const DEFAULT_RELAY_URL: &str = "http://localhost:3000/ask";

/// Calls a running relay over HTTP.
pub struct HttpRelayTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpRelayTransport {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| TransportError::Network(format!("failed to build http client: {e}")))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Interpret a relay reply. The body is decoded before the status is checked,
/// so a non-JSON error page is a decode failure.
pub fn interpret_reply(status: u16, body: &[u8]) -> Result<String, TransportError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| TransportError::Decode(e.to_string()))?;

    if !(200..300).contains(&status) {
        return Err(TransportError::Status {
            status,
            message: value
                .get("error")
                .and_then(Value::as_str)
                .map(str::to_string),
        });
    }

    value
        .get("answer")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| TransportError::Decode("missing answer field".to_string()))
}

#[async_trait]
impl RelayTransport for HttpRelayTransport {
    async fn ask(&self, question: &str) -> Result<String, TransportError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&AskRequest {
                question: question.to_string(),
            })
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        interpret_reply(status, &body)
    }
}
