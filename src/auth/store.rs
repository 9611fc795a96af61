//! File-backed credential store.
//!
//! Exactly one administrator record exists per deployment, stored as a
//! single JSON document. A missing, unreadable, or corrupt file reads as
//! "not configured"; partial data is never returned.

use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read credential record: {0}")]
    Read(#[source] io::Error),
    #[error("failed to write credential record: {0}")]
    Write(#[source] io::Error),
    #[error("failed to encode credential record: {0}")]
    Encode(#[source] serde_json::Error),
}

/// The single persisted administrator record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminRecord {
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True once an administrator record has been durably written.
    ///
    /// # Errors
    /// Returns an error if the record file exists but cannot be inspected.
    pub async fn is_configured(&self) -> Result<bool, StoreError> {
        match tokio::fs::metadata(&self.path).await {
            Ok(metadata) => Ok(metadata.is_file()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(StoreError::Read(err)),
        }
    }

    /// Write the record, replacing any prior content.
    ///
    /// The document lands in a sibling temp file first and is renamed into
    /// place, so readers never observe a half-written record.
    ///
    /// # Errors
    /// Returns an error if encoding or either filesystem step fails; a
    /// failed save must not be treated as success.
    pub async fn save(&self, record: &AdminRecord) -> Result<(), StoreError> {
        let data = serde_json::to_vec_pretty(record).map_err(StoreError::Encode)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &data)
            .await
            .map_err(StoreError::Write)?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(StoreError::Write)?;
        Ok(())
    }

    /// Load the record; absent, unreadable, and corrupt all read as `None`.
    ///
    /// # Errors
    /// Infallible today beyond the `Result` shape shared with the other
    /// store operations; corruption is logged and mapped to `None`.
    pub async fn load(&self) -> Result<Option<AdminRecord>, StoreError> {
        let data = match tokio::fs::read(&self.path).await {
            Ok(data) => data,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                warn!("credential record unreadable, treating as absent: {err}");
                return Ok(None);
            }
        };

        match serde_json::from_slice(&data) {
            Ok(record) => Ok(Some(record)),
            Err(err) => {
                warn!("credential record corrupt, treating as absent: {err}");
                Ok(None)
            }
        }
    }

    /// Health probe: the directory holding the record is accessible.
    pub async fn probe(&self) -> bool {
        let dir = self
            .path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        tokio::fs::metadata(dir).await.is_ok()
    }
}
