//! Query endpoint

use axum::{extract::State, Json};

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{QueryRequest, QueryResponse};

/// POST /api/query - grounded answer, or 403 when the query is rejected
pub async fn query_faq(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>> {
    let query = request.query.trim();
    if query.is_empty() {
        return Err(Error::InvalidRequest("Query must not be empty".to_string()));
    }

    tracing::info!("Query: {}", query);

    let response = state.pipeline().answer(query).await?;
    Ok(Json(QueryResponse { response }))
}
