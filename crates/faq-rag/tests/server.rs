//! HTTP surface over in-process providers

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use common::{scratch_config, HashEmbedder, ScriptedLlm};
use faq_rag::providers::EmbeddingProvider;
use faq_rag::server::{state::AppState, RagServer};
use faq_rag::Error;

const BOUNDARY: &str = "faq-rag-test-boundary";

fn router(dir: &tempfile::TempDir) -> Router {
    let state = AppState::with_providers(
        scratch_config(dir),
        Arc::new(HashEmbedder::new()),
        Arc::new(ScriptedLlm::new(" PKR 5,000.")),
    )
    .unwrap();
    RagServer::with_state(state).build_router()
}

fn multipart_upload(path: &str, filename: &str, content: &str, is_qa: &str) -> Request<Body> {
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\nContent-Type: application/octet-stream\r\n\r\n{c}\r\n--{b}\r\nContent-Disposition: form-data; name=\"is_qa\"\r\n\r\n{q}\r\n--{b}--\r\n",
        b = BOUNDARY,
        f = filename,
        c = content,
        q = is_qa,
    );
    Request::builder()
        .method("POST")
        .uri(path)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

fn query(path: &str, text: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::json!({ "query": text }).to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_and_ready() {
    let dir = tempfile::tempdir().unwrap();
    let app = router(&dir);

    let response = app
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(Request::get("/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

/// Embedding backend that is unreachable
struct OfflineEmbedder;

#[async_trait::async_trait]
impl EmbeddingProvider for OfflineEmbedder {
    async fn embed_batch(&self, _texts: &[String]) -> faq_rag::Result<Vec<Vec<f32>>> {
        Err(Error::embedding("connection refused"))
    }

    async fn health_check(&self) -> faq_rag::Result<bool> {
        Err(Error::embedding("connection refused"))
    }

    fn name(&self) -> &str {
        "offline"
    }
}

async fn ready_status(app: &Router) -> StatusCode {
    app.clone()
        .oneshot(Request::get("/ready").body(Body::empty()).unwrap())
        .await
        .unwrap()
        .status()
}

#[tokio::test]
async fn test_ready_follows_provider_health() {
    let dir = tempfile::tempdir().unwrap();
    let state = AppState::with_providers(
        scratch_config(&dir),
        Arc::new(OfflineEmbedder),
        Arc::new(ScriptedLlm::new(" PKR 5,000.")),
    )
    .unwrap();
    let server = RagServer::with_state(state);
    let app = server.build_router();

    assert!(!server.state().check_providers().await);
    assert_eq!(ready_status(&app).await, StatusCode::SERVICE_UNAVAILABLE);

    // Liveness is independent of provider health
    let response = app
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    server.state().set_ready(true);
    assert_eq!(ready_status(&app).await, StatusCode::OK);
}

#[tokio::test]
async fn test_healthy_providers_report_ready() {
    let dir = tempfile::tempdir().unwrap();
    let state = AppState::with_providers(
        scratch_config(&dir),
        Arc::new(HashEmbedder::new()),
        Arc::new(ScriptedLlm::new(" PKR 5,000.")),
    )
    .unwrap();
    state.set_ready(false);
    let server = RagServer::with_state(state);
    let app = server.build_router();
    assert_eq!(ready_status(&app).await, StatusCode::SERVICE_UNAVAILABLE);

    assert!(server.state().check_providers().await);
    assert_eq!(ready_status(&app).await, StatusCode::OK);
}

#[tokio::test]
async fn test_ingest_then_query() {
    let dir = tempfile::tempdir().unwrap();
    let app = router(&dir);

    let response = app
        .clone()
        .oneshot(multipart_upload(
            "/api/ingest",
            "faq.txt",
            "What is the minimum balance?\nPKR 5,000.",
            "true",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["documents_added"], 1);
    assert!(body["message"].as_str().unwrap().contains("faq.txt"));

    let response = app
        .clone()
        .oneshot(query("/api/query", "What is the minimum balance?"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["response"], "PKR 5,000.");

    let response = app
        .oneshot(Request::get("/api/stats").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let stats = json_body(response).await;
    assert_eq!(stats["documents"], 1);
    assert_eq!(stats["vectors"], 1);
}

#[tokio::test]
async fn test_policy_violation_is_forbidden() {
    let dir = tempfile::tempdir().unwrap();
    let app = router(&dir);

    let response = app
        .oneshot(query("/api/query", "How do I hack my account?"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = json_body(response).await;
    assert_eq!(body["error"]["type"], "policy_violation");
    assert_eq!(
        body["error"]["message"],
        "This request violates our usage policy: contains disallowed term 'hack'."
    );
}

#[tokio::test]
async fn test_unsupported_file_type() {
    let dir = tempfile::tempdir().unwrap();
    let app = router(&dir);

    let response = app
        .oneshot(multipart_upload("/api/ingest", "slides.pptx", "x", "false"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"]["type"], "unsupported_type");
}

#[tokio::test]
async fn test_missing_flag_is_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let app = router(&dir);

    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"a.txt\"\r\n\r\nhello\r\n--{b}--\r\n",
        b = BOUNDARY
    );
    let request = Request::builder()
        .method("POST")
        .uri("/api/ingest")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"]["type"], "invalid_request");
}

#[tokio::test]
async fn test_legacy_paths() {
    let dir = tempfile::tempdir().unwrap();
    let app = router(&dir);

    let response = app
        .clone()
        .oneshot(multipart_upload("/add_data", "notes.txt", "Branches open at 9am.", "false"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(query("/ask", "When do branches open?")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
