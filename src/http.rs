//! HTTP transport module for ask-relay
//!
//! Axum router with the question endpoint, a health check, and the embedded
//! browser UI. Cross-origin access is limited to the configured frontend origin.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{Method, header},
    response::{Html, IntoResponse},
    routing::{get, post},
};
use serde_json::Value;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::clients::{GeminiClient, Generator};
use crate::config::Config;
use crate::error::{RelayError, Result};
use crate::prompt::{AskResponse, INVALID_QUESTION_MESSAGE, Question, build_prompt};

const INDEX_HTML: &str = include_str!("../web/index.html");
const APP_JS: &str = include_str!("../web/app.js");
const STYLE_CSS: &str = include_str!("../web/style.css");

/// Shared state for HTTP server
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub generator: Arc<dyn Generator>,
}

impl AppState {
    pub fn new(config: Config, generator: Arc<dyn Generator>) -> Self {
        Self {
            config: Arc::new(config),
            generator,
        }
    }
}

/// Health check endpoint
pub async fn health_handler() -> impl IntoResponse {
    "ok"
}

/// Answer a single question through the provider.
pub async fn ask_handler(
    State(state): State<AppState>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<AskResponse>> {
    let Json(body) = body.map_err(|rejection| {
        tracing::debug!("Unreadable request body: {}", rejection.body_text());
        RelayError::validation(INVALID_QUESTION_MESSAGE)
    })?;
    let question = Question::from_body(&body)?;
    let prompt = build_prompt(&question);

    let answer = state.generator.generate(&prompt).await?;
    tracing::debug!(
        "Answered question (question_chars={}, answer_chars={})",
        question.as_str().len(),
        answer.len()
    );
    Ok(Json(AskResponse { answer }))
}

async fn index_handler() -> impl IntoResponse {
    Html(INDEX_HTML)
}

async fn app_js_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/javascript; charset=utf-8")],
        APP_JS,
    )
}

async fn style_handler() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], STYLE_CSS)
}

/// CORS policy allowing exactly one origin.
///
/// Other origins get no `access-control-allow-origin` header.
pub fn cors_layer(config: &Config) -> Result<CorsLayer> {
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list([config.allowed_origin()?]))
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]))
}

pub fn router(state: AppState) -> Result<Router> {
    let cors = cors_layer(&state.config)?;
    Ok(Router::new()
        .route("/", get(index_handler))
        .route("/app.js", get(app_js_handler))
        .route("/style.css", get(style_handler))
        .route("/health", get(health_handler))
        .route("/ask", post(ask_handler))
        .route("/ask-gemini", post(ask_handler))
        .layer(cors)
        .with_state(state))
}

/// Start the HTTP server
pub async fn start_http_server(config: Config) -> anyhow::Result<()> {
    let generator = GeminiClient::from_config(&config)
        .map_err(|e| anyhow::anyhow!("Failed to build Gemini client: {}", e))?;
    let bind = config.http_bind;
    let model = generator.model().to_string();
    let origin = config.frontend_url.clone();

    let app = router(AppState::new(config, Arc::new(generator)))?;

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind HTTP listener: {}", e))?;

    tracing::info!("Relay listening on http://{}", bind);
    tracing::info!("Gemini model: {}", model);
    tracing::info!("Allowing cross-origin requests from {}", origin);
    tracing::info!("Waiting for questions on POST /ask");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("HTTP server error: {}", e))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
