//! Question validation, prompt construction, and the wire types of `/ask`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{RelayError, Result};

/// Instruction placed in front of every question sent to the provider.
pub const PROMPT_PREFIX: &str = "Responda de forma concisa e factual, como uma busca do Google: ";

pub const INVALID_QUESTION_MESSAGE: &str =
    "Nenhuma pergunta válida foi fornecida no corpo da requisição.";

/// A validated question: always non-empty and trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question(String);

impl Question {
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(RelayError::validation(INVALID_QUESTION_MESSAGE));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Extract the `question` field from a request body.
    ///
    /// Anything other than an object with a string `question` is rejected the
    /// same way as a blank question.
    pub fn from_body(body: &Value) -> Result<Self> {
        match body.get("question") {
            Some(Value::String(s)) => Self::parse(s),
            _ => Err(RelayError::validation(INVALID_QUESTION_MESSAGE)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub fn build_prompt(question: &Question) -> String {
    format!("{PROMPT_PREFIX}{}", question.as_str())
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AskRequest {
    pub question: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AskResponse {
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}
