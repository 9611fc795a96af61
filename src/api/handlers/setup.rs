//! Setup status and one-shot administrator provisioning endpoints.

use std::sync::Arc;

use axum::extract::Extension;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::ToSchema;

use crate::api::error::ErrorBody;
use crate::auth::{AuthError, CredentialStore, SetupGuard};

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SetupStatus {
    pub configured: bool,
}

#[derive(ToSchema, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetupRequest {
    pub email: String,
    pub password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SetupResponse {
    pub success: bool,
    pub message: String,
    pub email_sent: bool,
}

#[utoipa::path(
    get,
    path = "/api/setup-status",
    responses(
        (status = 200, description = "Whether an administrator has been provisioned", body = SetupStatus),
        (status = 500, description = "Credential store inaccessible", body = ErrorBody),
    ),
    tag = "setup",
)]
#[instrument(skip_all)]
pub async fn setup_status(
    Extension(store): Extension<Arc<CredentialStore>>,
) -> Result<Json<SetupStatus>, AuthError> {
    let configured = store.is_configured().await?;
    Ok(Json(SetupStatus { configured }))
}

#[utoipa::path(
    post,
    path = "/api/setup-admin",
    request_body = SetupRequest,
    responses(
        (status = 200, description = "Administrator provisioned", body = SetupResponse),
        (status = 400, description = "Already configured or invalid input", body = ErrorBody),
        (status = 500, description = "Provisioning failed", body = ErrorBody),
    ),
    tag = "setup",
)]
#[instrument(skip_all)]
pub async fn setup_admin(
    Extension(guard): Extension<Arc<SetupGuard>>,
    payload: Option<Json<SetupRequest>>,
) -> Result<Json<SetupResponse>, AuthError> {
    let Some(Json(request)) = payload else {
        return Err(AuthError::Validation(
            "invalid or missing request body".to_string(),
        ));
    };

    let outcome = guard.setup_admin(&request.email, &request.password).await?;

    Ok(Json(SetupResponse {
        success: true,
        message: "Administrator configured successfully".to_string(),
        email_sent: outcome.email_sent,
    }))
}
