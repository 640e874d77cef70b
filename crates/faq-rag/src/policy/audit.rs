//! Append-only audit log of policy rejections

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Where in the request the violation was caught
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditStage {
    /// Incoming query, before retrieval
    Query,
    /// Generated answer, before it is returned
    Response,
}

/// One audit line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub timestamp: DateTime<Utc>,
    pub stage: AuditStage,
    /// The user's query
    pub input: String,
    pub reason: String,
}

/// JSON-lines audit file; writes are serialized
pub struct AuditLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record a violation. Write failures are logged, never returned.
    pub fn record(&self, stage: AuditStage, input: &str, reason: &str) {
        tracing::warn!(target: "audit", ?stage, input, reason, "Blocked by content policy");

        let record = AuditRecord {
            timestamp: Utc::now(),
            stage,
            input: input.to_string(),
            reason: reason.to_string(),
        };

        if let Err(e) = self.append(&record) {
            tracing::error!("Failed to write audit log {}: {}", self.path.display(), e);
        }
    }

    fn append(&self, record: &AuditRecord) -> std::io::Result<()> {
        let line = serde_json::to_string(record)?;
        let _guard = self.lock.lock();

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(file, "{}", line)
    }

    /// Read back every record (for inspection and tests)
    pub fn read_all(&self) -> std::io::Result<Vec<AuditRecord>> {
        let _guard = self.lock.lock();
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = std::fs::read_to_string(&self.path)?;
        raw.lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| serde_json::from_str(l).map_err(std::io::Error::from))
            .collect()
    }
}
