//! Health probe handlers.
//!
//! Two probe endpoints:
//! - `/live`: process liveness only (no dependency checks)
//! - `/health`: store-aware status with a detailed JSON payload

use std::sync::Arc;

use axum::extract::Extension;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Json};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use crate::auth::CredentialStore;
use crate::GIT_COMMIT_HASH;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Health {
    commit: String,
    name: String,
    version: String,
    store: String,
}

#[utoipa::path(
    get,
    path = "/live",
    responses(
        (status = 200, description = "Process is alive")
    ),
    tag = "health",
)]
/// Report process liveness without checking external dependencies.
pub async fn live() -> impl IntoResponse {
    StatusCode::OK
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Credential store is accessible", body = Health),
        (status = 503, description = "Credential store is inaccessible", body = Health)
    ),
    tag = "health",
)]
/// Perform a detailed health check, probing the credential store location.
pub async fn health(store: Extension<Arc<CredentialStore>>) -> impl IntoResponse {
    let store_ok = store.probe().await;
    if store_ok {
        debug!("credential store is accessible");
    } else {
        debug!("credential store is inaccessible");
    }

    let health = Health {
        commit: GIT_COMMIT_HASH.to_string(),
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: if store_ok {
            "ok".to_string()
        } else {
            "error".to_string()
        },
    };

    let short_hash = if health.commit.len() > 7 {
        &health.commit[0..7]
    } else {
        ""
    };

    let headers = format!("{}:{}:{}", health.name, health.version, short_hash)
        .parse::<HeaderValue>()
        .map(|x_app_header_value| {
            let mut headers = HeaderMap::new();
            headers.insert("X-App", x_app_header_value);
            headers
        })
        .unwrap_or_else(|_| HeaderMap::new());

    let status = if store_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, headers, Json(health))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn live_is_plain_ok() {
        let response = live().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn health_reports_ok_for_accessible_store() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = Arc::new(CredentialStore::new(dir.path().join("admin.json")));

        let response = health(Extension(store)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("X-App"));

        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let body: Health = serde_json::from_slice(&bytes)?;
        assert_eq!(body.name, env!("CARGO_PKG_NAME"));
        assert_eq!(body.store, "ok");
        Ok(())
    }

    #[tokio::test]
    async fn health_degrades_when_store_location_is_gone() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = Arc::new(CredentialStore::new(
            dir.path().join("no-such-dir").join("admin.json"),
        ));

        let response = health(Extension(store)).await.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let body: Health = serde_json::from_slice(&bytes)?;
        assert_eq!(body.store, "error");
        Ok(())
    }
}
