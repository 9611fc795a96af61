//! HTTP surface: router construction, middleware layers, serve loop.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::Body;
use axum::extract::Extension;
use axum::http::{HeaderName, HeaderValue, Method, Request};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::PropagateRequestIdLayer;
use tower_http::set_header::SetRequestHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug_span, info, Span};
use ulid::Ulid;
use utoipa::openapi::{InfoBuilder, License, OpenApiBuilder, Tag};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::auth::{Authenticator, CredentialStore, SetupGuard, TokenSigner};
use crate::email::CredentialNotifier;

pub mod error;
pub mod handlers;

use handlers::{health, login, setup, verify};

/// Components wired into the router, built once at startup and injected via
/// `Extension` so tests can assemble isolated instances.
pub struct AppState {
    pub store: Arc<CredentialStore>,
    pub setup_guard: Arc<SetupGuard>,
    pub authenticator: Arc<Authenticator>,
    pub signer: Arc<TokenSigner>,
}

impl AppState {
    #[must_use]
    pub fn new(
        store: CredentialStore,
        signer: TokenSigner,
        notifier: Arc<dyn CredentialNotifier>,
    ) -> Self {
        let store = Arc::new(store);
        let signer = Arc::new(signer);
        Self {
            setup_guard: Arc::new(SetupGuard::new(Arc::clone(&store), notifier)),
            authenticator: Arc::new(Authenticator::new(
                Arc::clone(&store),
                Arc::clone(&signer),
            )),
            store,
            signer,
        }
    }
}

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    // Reuse the same router wiring and only return the generated OpenAPI spec.
    let (_router, openapi) = api_router().split_for_parts();
    openapi
}

/// Build the router that also drives the `OpenAPI` document.
///
/// Add new endpoints here via `.routes(routes!(...))` so they are both served
/// and included in the generated `OpenAPI` spec.
fn api_router() -> OpenApiRouter {
    // `routes!` reads #[utoipa::path] to bind HTTP method + path and add the route to OpenAPI.
    let mut router = OpenApiRouter::with_openapi(cargo_openapi())
        .routes(routes!(health::health))
        .routes(routes!(health::live))
        .routes(routes!(setup::setup_status))
        .routes(routes!(setup::setup_admin))
        .routes(routes!(login::login))
        .routes(routes!(verify::verify_token));

    let mut gate_tag = Tag::new("auth");
    gate_tag.description = Some("Single-administrator provisioning and login API".to_string());
    router.get_openapi_mut().tags = Some(vec![gate_tag]);

    router
}

fn cargo_openapi() -> utoipa::openapi::OpenApi {
    // Use Cargo.toml metadata instead of the utoipa-axum crate info defaults.
    let mut info = InfoBuilder::new()
        .title(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .description(Some(env!("CARGO_PKG_DESCRIPTION")))
        .build();
    info.license = Some(License::new(env!("CARGO_PKG_LICENSE")));

    OpenApiBuilder::new().info(info).build()
}

/// Serve the API until the process receives an interrupt.
///
/// # Errors
/// Returns an error if the listener cannot bind or the server fails.
pub async fn new(port: u16, state: AppState) -> Result<()> {
    let cors = CorsLayer::new()
        // allow `GET` and `POST` when accessing the resource
        .allow_methods([Method::GET, Method::POST])
        // allow requests from any origin
        .allow_origin(Any)
        .allow_headers(Any);

    let (router, _openapi) = api_router().split_for_parts();
    let app = router.layer(
        ServiceBuilder::new()
            .layer(SetRequestHeaderLayer::if_not_present(
                HeaderName::from_static("x-request-id"),
                |_req: &Request<Body>| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
            ))
            .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                "x-request-id",
            )))
            .layer(TraceLayer::new_for_http().make_span_with(make_span))
            .layer(cors)
            .layer(Extension(state.store))
            .layer(Extension(state.setup_guard))
            .layer(Extension(state.authenticator))
            .layer(Extension(state.signer)),
    );

    let listener = TcpListener::bind(format!("::0:{port}"))
        .await
        .with_context(|| format!("failed to bind port {port}"))?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

// span
fn make_span(request: &Request<Body>) -> Span {
    let path = request.uri().path();
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");

    debug_span!("http-request", path, request_id)
}
