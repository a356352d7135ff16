//! Integration tests for the `/ask` relay endpoint.
//!
//! The router is exercised in-process with a scripted provider, so no network
//! access or API key is required.

use std::sync::{Arc, Mutex};

use ask_relay::Config;
use ask_relay::clients::{Generator, ProviderError};
use ask_relay::error::GENERIC_FAILURE_MESSAGE;
use ask_relay::http::{AppState, router};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt; // for `oneshot`

const ORIGIN: &str = "http://localhost:5500";

/// Provider double that records prompts and replays a fixed outcome.
struct ScriptedGenerator {
    answer: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    fn answering(answer: &str) -> Arc<Self> {
        Arc::new(Self {
            answer: Some(answer.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            answer: None,
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.answer.clone().ok_or_else(|| ProviderError::Status {
            status: 429,
            body: "RESOURCE_EXHAUSTED: quota for key test-key".to_string(),
        })
    }

    fn model(&self) -> &str {
        "scripted"
    }
}

fn test_config() -> Config {
    Config::from_lookup(|key| match key {
        "GEMINI_API_KEY" => Some("test-key".to_string()),
        "FRONTEND_URL" => Some(ORIGIN.to_string()),
        _ => None,
    })
    .expect("test config")
}

fn app(generator: Arc<ScriptedGenerator>) -> axum::Router {
    router(AppState::new(test_config(), generator)).expect("router")
}

async fn post_raw(app: axum::Router, body: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .uri("/ask")
                .method("POST")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn post_json(app: axum::Router, body: Value) -> (StatusCode, Value) {
    post_raw(app, &body.to_string()).await
}

#[tokio::test]
async fn answers_capital_of_france() {
    let generator = ScriptedGenerator::answering("Paris");
    let (status, body) = post_json(
        app(generator.clone()),
        json!({ "question": "capital of France" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "answer": "Paris" }));
    assert_eq!(
        generator.prompts(),
        vec![
            "Responda de forma concisa e factual, como uma busca do Google: capital of France"
                .to_string()
        ]
    );
}

#[tokio::test]
async fn invalid_questions_are_bad_requests() {
    for body in [
        json!({}),
        json!({ "question": 42 }),
        json!({ "question": "   " }),
    ] {
        let generator = ScriptedGenerator::answering("unused");
        let (status, reply) = post_json(app(generator.clone()), body.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {body}");
        assert!(reply["error"].is_string());
        assert!(generator.prompts().is_empty());
    }
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let (status, reply) = post_raw(
        app(ScriptedGenerator::answering("unused")),
        "{\"question\": ",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(reply["error"].is_string());
}

#[tokio::test]
async fn validation_is_stateless() {
    let generator = ScriptedGenerator::answering("unused");
    let router = app(generator);
    let mut replies = Vec::new();
    for _ in 0..3 {
        replies.push(post_json(router.clone(), json!({ "question": "  " })).await);
    }
    assert!(replies.iter().all(|r| *r == replies[0]));
    assert_eq!(replies[0].0, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn provider_failure_is_generic_500() {
    let generator = ScriptedGenerator::failing();
    let (status, body) = post_json(app(generator.clone()), json!({ "question": "q" })).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": GENERIC_FAILURE_MESSAGE }));
    let raw = body.to_string();
    assert!(!raw.contains("RESOURCE_EXHAUSTED"));
    assert!(!raw.contains("test-key"));
    assert_eq!(generator.prompts().len(), 1, "no retry");
}

#[tokio::test]
async fn legacy_route_is_served() {
    let response = app(ScriptedGenerator::answering("ok"))
        .oneshot(
            Request::builder()
                .uri("/ask-gemini")
                .method("POST")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({ "question": "hi" }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

async fn preflight(origin: &str) -> axum::http::Response<Body> {
    app(ScriptedGenerator::answering("unused"))
        .oneshot(
            Request::builder()
                .uri("/ask")
                .method("OPTIONS")
                .header(header::ORIGIN, origin)
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn preflight_allows_configured_origin() {
    let response = preflight(ORIGIN).await;
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some(ORIGIN)
    );
}

#[tokio::test]
async fn preflight_rejects_other_origins() {
    let response = preflight("http://evil.example").await;
    assert!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none()
    );
}

#[tokio::test]
async fn serves_health_and_ui() {
    let router = app(ScriptedGenerator::answering("unused"));

    let health = router
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(health.status(), StatusCode::OK);

    let index = router
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(index.status(), StatusCode::OK);
    let html = axum::body::to_bytes(index.into_body(), usize::MAX)
        .await
        .unwrap();
    let html = String::from_utf8(html.to_vec()).unwrap();
    assert!(html.contains("id=\"questionInput\""));
    assert!(html.contains("app.js"));
}
