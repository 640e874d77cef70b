//! API routes for the FAQ RAG server

pub mod ingest;
pub mod query;

use axum::{
    extract::{DefaultBodyLimit, State},
    routing::{get, post},
    Json, Router,
};

use crate::server::state::AppState;
use crate::types::response::StatsResponse;

/// Build all API routes
pub fn api_routes(max_upload_size: usize) -> Router<AppState> {
    Router::new()
        // Ingestion - with larger body limit for file uploads
        .route(
            "/ingest",
            post(ingest::ingest_file).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .route("/query", post(query::query_faq))
        .route("/stats", get(stats))
        .route("/info", get(info))
}

/// Paths kept for clients of the earlier service
pub fn legacy_routes(max_upload_size: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/add_data",
            post(ingest::ingest_file).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .route("/ask", post(query::query_faq))
}

/// GET /api/stats - corpus counts
async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.corpus().stats();
    Json(StatsResponse {
        documents: stats.documents,
        vectors: stats.vectors,
        dimensions: stats.dimensions,
    })
}

/// API info endpoint
async fn info(State(state): State<AppState>) -> Json<serde_json::Value> {
    let config = state.config();
    Json(serde_json::json!({
        "name": "faq-rag",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "FAQ question answering with content-policy guardrails",
        "embedding_model": config.embeddings.model,
        "generation_model": state.llm().model(),
        "top_k": config.retrieval.top_k,
        "endpoints": {
            "POST /api/ingest": "Upload a file (multipart: file, is_qa)",
            "POST /api/query": "Ask a question ({query} -> {response})",
            "GET /api/stats": "Document and vector counts",
            "GET /api/info": "This document"
        }
    }))
}
