use crate::gate::{guard, Gatekeeper};
use anyhow::Result;
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    middleware::from_fn_with_state,
    routing::get,
    Extension, Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;

pub mod handlers;
pub mod proxy;

pub use proxy::Upstream;

/// Build the application router.
///
/// `GET`, `HEAD` and `OPTIONS /health` belong to the gatekeeper and are
/// answered without a session. Every other request, including other methods on
/// `/health`, passes the gate before reaching the upstream.
#[must_use]
pub fn router(gate: Arc<Gatekeeper>, upstream: Upstream) -> Router {
    let gated = Router::new()
        .fallback(proxy::forward)
        .with_state(upstream.clone())
        .layer(from_fn_with_state(gate, guard));

    Router::new()
        .route(
            "/health",
            get(handlers::health)
                .head(handlers::health)
                .options(handlers::health)
                .fallback_service(gated.clone()),
        )
        .layer(Extension(upstream))
        .merge(gated)
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(port: u16, gate: Arc<Gatekeeper>, upstream: Upstream) -> Result<()> {
    let app = router(gate, upstream).layer(
        ServiceBuilder::new()
            .layer(SetRequestHeaderLayer::if_not_present(
                HeaderName::from_static("x-request-id"),
                |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
            ))
            .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                "x-request-id",
            )))
            .layer(TraceLayer::new_for_http().make_span_with(make_span)),
    );

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {err}");
            }
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
