//! File ingestion endpoint

use axum::{
    extract::{Multipart, State},
    Json,
};
use std::time::Instant;

use crate::error::{Error, Result};
use crate::ingestion::IngestMode;
use crate::server::state::AppState;
use crate::types::IngestResponse;

/// POST /api/ingest - multipart `file` plus `is_qa`
pub async fn ingest_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<IngestResponse>> {
    let start = Instant::now();
    let mut upload: Option<(String, Vec<u8>)> = None;
    let mut is_qa: Option<bool> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::InvalidRequest(format!("Failed to read multipart field: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "is_qa" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| Error::InvalidRequest(format!("Failed to read is_qa: {}", e)))?;
                is_qa = Some(parse_flag(&value)?);
            }
            "file" => {
                let filename = field
                    .file_name()
                    .map(str::to_string)
                    .ok_or_else(|| Error::InvalidRequest("File field has no filename".to_string()))?;
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| Error::extraction(&filename, format!("Failed to read upload: {}", e)))?;
                upload = Some((filename, data.to_vec()));
            }
            other => tracing::debug!("Ignoring multipart field '{}'", other),
        }
    }

    let (filename, data) =
        upload.ok_or_else(|| Error::InvalidRequest("Missing 'file' field".to_string()))?;
    let is_qa = is_qa.ok_or_else(|| Error::InvalidRequest("Missing 'is_qa' field".to_string()))?;
    let mode = IngestMode::from_flag(is_qa);

    tracing::info!("Processing file: {} ({} bytes, {} mode)", filename, data.len(), mode);

    let outcome = state.coordinator().ingest_file(&filename, data, mode).await?;

    Ok(Json(IngestResponse {
        success: true,
        message: format!(
            "Successfully processed file '{}': {} documents added",
            filename, outcome.documents_added
        ),
        documents_added: outcome.documents_added,
        total_documents: outcome.total_documents,
        processing_time_ms: start.elapsed().as_millis() as u64,
    }))
}

/// Form booleans as sent by browsers and HTTP clients
fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(Error::InvalidRequest(format!("Invalid is_qa value: '{}'", other))),
    }
}
