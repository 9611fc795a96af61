//! Administrator login endpoint.

use std::sync::Arc;

use axum::extract::Extension;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::ToSchema;

use crate::api::error::ErrorBody;
use crate::auth::{AuthError, Authenticator};

#[derive(ToSchema, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Identity claim echoed back to the client.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct UserInfo {
    pub email: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub user: UserInfo,
}

#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credentials accepted, token issued", body = LoginResponse),
        (status = 400, description = "Administrator not configured or invalid input", body = ErrorBody),
        (status = 401, description = "Invalid credentials", body = ErrorBody),
        (status = 500, description = "Login failed", body = ErrorBody),
    ),
    tag = "auth",
)]
#[instrument(skip_all)]
pub async fn login(
    Extension(authenticator): Extension<Arc<Authenticator>>,
    payload: Option<Json<LoginRequest>>,
) -> Result<Json<LoginResponse>, AuthError> {
    let Some(Json(request)) = payload else {
        return Err(AuthError::Validation(
            "invalid or missing request body".to_string(),
        ));
    };

    let grant = authenticator.login(&request.email, &request.password).await?;

    Ok(Json(LoginResponse {
        success: true,
        token: grant.token,
        user: UserInfo { email: grant.email },
    }))
}
