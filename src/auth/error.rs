use thiserror::Error;

use super::store::StoreError;

/// Failures surfaced by the provisioning and authentication core.
///
/// Each variant maps to a stable HTTP status and error code at the API
/// boundary; `Storage` and `Internal` detail stays in the server log.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),
    #[error("administrator already configured")]
    AlreadyConfigured,
    #[error("administrator not configured yet")]
    NotConfigured,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("token not provided")]
    MissingToken,
    #[error("invalid token")]
    InvalidToken,
    #[error("storage failure: {0}")]
    Storage(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        Self::Storage(err.to_string())
    }
}
