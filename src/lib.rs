//! ask-relay: a single-hop question relay in front of the Gemini API.
//!
//! The relay validates a question, wraps it in a fixed instruction, asks the
//! provider, and returns the generated text. The `ui` module drives the
//! client side of the exchange.

pub mod clients;
pub mod config;
pub mod error;
pub mod http;
pub mod prompt;
pub mod ui;

pub use config::{Config, load_env};
pub use error::{RelayError, Result};
