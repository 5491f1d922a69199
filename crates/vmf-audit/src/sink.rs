//! Audit sinks
//!
//! [`AuditSink`] is append-only: records are never updated or removed.
//! Sink failures are reported to the caller, which is expected to degrade
//! them to a warning rather than fail the audited operation.

use crate::record::AuditRecord;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;

/// Audit sink errors
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    /// Underlying writer failed
    #[error("audit i/o failed: {0}")]
    Io(#[from] std::io::Error),

    /// Record could not be encoded
    #[error("audit encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Append-only recorder of audit records
#[async_trait::async_trait]
pub trait AuditSink: Send + Sync {
    /// Append one record
    async fn record(&self, record: &AuditRecord) -> Result<(), AuditError>;
}

/// Keeps records in memory, for inspection
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    inner: Mutex<Vec<AuditRecord>>,
}

impl MemoryAuditSink {
    /// Create new empty sink
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all records, oldest first
    #[must_use]
    pub fn records(&self) -> Vec<AuditRecord> {
        self.inner.lock().clone()
    }

    /// Number of records
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Check if no record was written
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

#[async_trait::async_trait]
impl AuditSink for MemoryAuditSink {
    async fn record(&self, record: &AuditRecord) -> Result<(), AuditError> {
        self.inner.lock().push(record.clone());
        Ok(())
    }
}

/// Appends one JSON object per line to a file
#[derive(Debug)]
pub struct JsonLinesAuditSink {
    path: PathBuf,
    file: tokio::sync::Mutex<File>,
}

impl JsonLinesAuditSink {
    /// Open (or create) `path` for appending
    ///
    /// # Errors
    /// `AuditError::Io` if the file cannot be opened.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, AuditError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        tracing::debug!("audit log opened at {}", path.display());
        Ok(Self {
            path,
            file: tokio::sync::Mutex::new(file),
        })
    }

    /// Backing file path
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl AuditSink for JsonLinesAuditSink {
    async fn record(&self, record: &AuditRecord) -> Result<(), AuditError> {
        let mut line = record.to_json_line()?;
        line.push('\n');

        // One write per record keeps lines whole under concurrent callers.
        let mut file = self.file.lock().await;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

/// Emits records as structured events on the `vmf::audit` target
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl TracingAuditSink {
    /// Create new sink
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl AuditSink for TracingAuditSink {
    async fn record(&self, record: &AuditRecord) -> Result<(), AuditError> {
        let line = record.to_json_line()?;
        tracing::info!(target: "vmf::audit", success = record.success, "{line}");
        Ok(())
    }
}
