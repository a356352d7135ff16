use std::fmt;
use std::net::SocketAddr;

use axum::http::HeaderValue;

use crate::clients::gemini::{DEFAULT_API_BASE, DEFAULT_MODEL};
use crate::error::{RelayError, Result};

pub const DEFAULT_FRONTEND_URL: &str = "http://127.0.0.1:5500";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_LOG_FILTER: &str = "ask_relay=info";

/// Process-wide configuration, read once at startup and never mutated.
#[derive(Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_api_base: String,
    pub gemini_timeout_ms: Option<u64>,
    /// The single origin allowed to call the relay from a browser
    pub frontend_url: String,
    pub http_bind: SocketAddr,
}

// The credential never reaches logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("gemini_api_key", &"<redacted>")
            .field("gemini_model", &self.gemini_model)
            .field("gemini_api_base", &self.gemini_api_base)
            .field("gemini_timeout_ms", &self.gemini_timeout_ms)
            .field("frontend_url", &self.frontend_url)
            .field("http_bind", &self.http_bind)
            .finish()
    }
}

fn is_placeholder(s: &str) -> bool {
    let t = s.trim();
    t.is_empty()
        || t.contains("${")
        || t.eq_ignore_ascii_case("your-api-key-here")
        || t.eq_ignore_ascii_case("changeme")
}

/// Load environment variables from `RELAY_ENV_FILE` or `./.env`, ignoring a missing file.
pub fn load_env() {
    if let Ok(env_path) = std::env::var("RELAY_ENV_FILE") {
        let _ = dotenvy::from_path(env_path);
    } else {
        let _ = dotenvy::dotenv();
    }
}

impl Config {
    /// Load configuration from the process environment. Call [`load_env`] first
    /// so `.env` values are visible.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let gemini_api_key = match lookup("GEMINI_API_KEY") {
            Some(key) if !is_placeholder(&key) => key.trim().to_string(),
            _ => {
                return Err(RelayError::config(
                    "GEMINI_API_KEY is not set. Create a .env file in the project root and add your key.",
                ));
            }
        };

        let frontend_url = non_empty("FRONTEND_URL")
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_FRONTEND_URL.to_string());
        if HeaderValue::from_str(&frontend_url).is_err() {
            return Err(RelayError::config(format!(
                "FRONTEND_URL '{frontend_url}' is not a valid origin"
            )));
        }

        let http_bind = match non_empty("RELAY_HTTP_BIND") {
            Some(v) => v.trim().parse::<SocketAddr>().map_err(|e| {
                RelayError::config(format!("RELAY_HTTP_BIND '{v}' is not a socket address: {e}"))
            })?,
            None => {
                let port = match non_empty("PORT") {
                    Some(v) => v.trim().parse::<u16>().map_err(|e| {
                        RelayError::config(format!("PORT '{v}' is not a valid port: {e}"))
                    })?,
                    None => DEFAULT_PORT,
                };
                SocketAddr::from(([127, 0, 0, 1], port))
            }
        };

        let gemini_timeout_ms = non_empty("GEMINI_TIMEOUT_MS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|&ms| ms > 0);

        Ok(Self {
            gemini_api_key,
            gemini_model: non_empty("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            gemini_api_base: non_empty("GEMINI_API_BASE")
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            gemini_timeout_ms,
            frontend_url,
            http_bind,
        })
    }

    /// Allowed origin as a header value; validated in `from_lookup`.
    pub fn allowed_origin(&self) -> Result<HeaderValue> {
        HeaderValue::from_str(&self.frontend_url)
            .map_err(|e| RelayError::config(format!("invalid FRONTEND_URL: {e}")))
    }
}
