//! Query request types

use serde::{Deserialize, Serialize};

/// Query request for the grounded answer endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    /// The user's question
    pub query: String,
}

