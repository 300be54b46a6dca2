//! JSONL audit trail of write actions

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::wallet::Asset;

/// Entry in the audit log
#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub action_id: Uuid,
    pub action: &'static str,
    pub asset: Option<Asset>,
    /// Amount as entered, display units
    pub amount: Option<String>,
    pub account: String,
    pub status: &'static str,
    pub approve_tx: Option<String>,
    pub tx: Option<String>,
    pub error: Option<String>,
    pub duration_ms: u64,
}

impl AuditEntry {
    pub fn pending(
        action_id: Uuid,
        action: &'static str,
        asset: Option<Asset>,
        amount: Option<String>,
        account: String,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            action_id,
            action,
            asset,
            amount,
            account,
            status: "pending",
            approve_tx: None,
            tx: None,
            error: None,
            duration_ms: 0,
        }
    }

    /// Completion entry for the same action
    pub fn completed(&self, approve_tx: Option<String>, tx: String, duration_ms: u64) -> Self {
        Self {
            timestamp: Utc::now(),
            status: "success",
            approve_tx,
            tx: Some(tx),
            duration_ms,
            ..self.clone()
        }
    }

    pub fn failed(&self, error: String, duration_ms: u64) -> Self {
        Self {
            timestamp: Utc::now(),
            status: "error",
            error: Some(error),
            duration_ms,
            ..self.clone()
        }
    }
}

/// Append-only audit log file
pub struct AuditLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl AuditLog {
    /// # Arguments
    /// * `path` - Path to the audit log file (JSONL format)
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append an entry. Failures are logged, never returned.
    pub async fn record(&self, entry: &AuditEntry) {
        let _guard = self.lock.lock().await;
        if let Err(e) = self.append(entry) {
            tracing::warn!(error = %e, path = %self.path.display(), "Failed to write audit log entry");
        }
    }

    fn append(&self, entry: &AuditEntry) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let json = serde_json::to_string(entry)?;
        writeln!(file, "{}", json)?;
        Ok(())
    }
}
