//! End-to-end flow over the HTTP handlers against a temporary store:
//! fresh deployment, one-shot setup, login, token verification.

use std::sync::Arc;

use anyhow::Result;
use axum::body::to_bytes;
use axum::extract::Extension;
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use secrecy::SecretString;
use tempfile::TempDir;

use pordisto::api::handlers::{login, setup, verify};
use pordisto::auth::{Authenticator, CredentialStore, SetupGuard, TokenSigner};
use pordisto::email::SkipNotifier;

struct TestGate {
    _dir: TempDir,
    store: Arc<CredentialStore>,
    guard: Arc<SetupGuard>,
    authenticator: Arc<Authenticator>,
    signer: Arc<TokenSigner>,
}

fn test_gate() -> Result<TestGate> {
    let dir = tempfile::tempdir()?;
    let store = Arc::new(CredentialStore::new(dir.path().join("admin.json")));
    let signer = Arc::new(TokenSigner::new(&SecretString::from(
        "flow-test-secret".to_string(),
    )));
    let guard = Arc::new(SetupGuard::new(Arc::clone(&store), Arc::new(SkipNotifier)));
    let authenticator = Arc::new(Authenticator::new(Arc::clone(&store), Arc::clone(&signer)));

    Ok(TestGate {
        _dir: dir,
        store,
        guard,
        authenticator,
        signer,
    })
}

async fn body_json(response: Response) -> Result<serde_json::Value> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn setup_payload(email: &str, password: &str) -> Option<Json<setup::SetupRequest>> {
    Some(Json(setup::SetupRequest {
        email: email.to_string(),
        password: password.to_string(),
    }))
}

fn login_payload(email: &str, password: &str) -> Option<Json<login::LoginRequest>> {
    Some(Json(login::LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
    }))
}

#[tokio::test]
async fn fresh_deployment_reports_unconfigured() -> Result<()> {
    let gate = test_gate()?;

    let response = setup::setup_status(Extension(Arc::clone(&gate.store)))
        .await
        .into_response();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await?,
        serde_json::json!({ "configured": false })
    );
    Ok(())
}

#[tokio::test]
async fn full_setup_login_verify_flow() -> Result<()> {
    let gate = test_gate()?;

    // Provision the administrator.
    let response = setup::setup_admin(
        Extension(Arc::clone(&gate.guard)),
        setup_payload("a@b.com", "secret1"),
    )
    .await
    .into_response();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await?;
    assert_eq!(body["success"], serde_json::json!(true));
    assert_eq!(body["emailSent"], serde_json::json!(false));

    // Immediately repeating the same call is refused.
    let response = setup::setup_admin(
        Extension(Arc::clone(&gate.guard)),
        setup_payload("a@b.com", "secret1"),
    )
    .await
    .into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await?["code"],
        serde_json::json!("already_configured")
    );

    // Status flips to configured.
    let response = setup::setup_status(Extension(Arc::clone(&gate.store)))
        .await
        .into_response();
    assert_eq!(
        body_json(response).await?,
        serde_json::json!({ "configured": true })
    );

    // Wrong password is refused with the generic credentials error.
    let response = login::login(
        Extension(Arc::clone(&gate.authenticator)),
        login_payload("a@b.com", "wrong"),
    )
    .await
    .into_response();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(response).await?["code"],
        serde_json::json!("invalid_credentials")
    );

    // Matching credentials return a token.
    let response = login::login(
        Extension(Arc::clone(&gate.authenticator)),
        login_payload("a@b.com", "secret1"),
    )
    .await
    .into_response();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await?;
    assert_eq!(body["user"]["email"], serde_json::json!("a@b.com"));
    let token = body["token"].as_str().expect("token string").to_string();

    // The token passes verification and carries the identity claim.
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {token}"))?);
    let response = verify::verify_token(Extension(Arc::clone(&gate.signer)), headers)
        .await
        .into_response();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await?,
        serde_json::json!({ "valid": true, "user": { "email": "a@b.com" } })
    );

    // No header at all is a missing-token failure.
    let response = verify::verify_token(Extension(Arc::clone(&gate.signer)), HeaderMap::new())
        .await
        .into_response();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(response).await?["code"],
        serde_json::json!("missing_token")
    );

    // A token signed with a different secret is rejected.
    let foreign = TokenSigner::new(&SecretString::from("other-secret".to_string()));
    let foreign_token = foreign.issue("a@b.com")?;
    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {foreign_token}"))?,
    );
    let response = verify::verify_token(Extension(gate.signer), headers)
        .await
        .into_response();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(response).await?["code"],
        serde_json::json!("invalid_token")
    );

    Ok(())
}

#[tokio::test]
async fn login_before_setup_directs_back_to_setup() -> Result<()> {
    let gate = test_gate()?;

    let response = login::login(
        Extension(Arc::clone(&gate.authenticator)),
        login_payload("a@b.com", "secret1"),
    )
    .await
    .into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await?["code"],
        serde_json::json!("not_configured")
    );
    Ok(())
}
