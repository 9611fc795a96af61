//! Bearer-token verification endpoint.

use std::sync::Arc;

use axum::extract::Extension;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::ToSchema;

use super::login::UserInfo;
use crate::api::error::ErrorBody;
use crate::auth::{AuthError, TokenSigner};

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct VerifyResponse {
    pub valid: bool,
    pub user: UserInfo,
}

#[utoipa::path(
    get,
    path = "/api/verify-token",
    responses(
        (status = 200, description = "Token accepted, decoded claims returned", body = VerifyResponse),
        (status = 401, description = "Missing, malformed, or expired token", body = ErrorBody),
    ),
    tag = "auth",
)]
#[instrument(skip_all)]
pub async fn verify_token(
    Extension(signer): Extension<Arc<TokenSigner>>,
    headers: HeaderMap,
) -> Result<Json<VerifyResponse>, AuthError> {
    let token = bearer_token(&headers)?;
    let claims = signer.verify(token)?;

    Ok(Json(VerifyResponse {
        valid: true,
        user: UserInfo { email: claims.sub },
    }))
}

/// Extract the bearer token from the Authorization header.
fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    let token = value
        .trim()
        .strip_prefix("Bearer ")
        .or_else(|| value.trim().strip_prefix("bearer "))
        .ok_or(AuthError::MissingToken)?
        .trim();

    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(token)
}
