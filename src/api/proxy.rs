//! Relay admitted requests to the protected origin.

use crate::APP_USER_AGENT;
use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{header, HeaderMap, HeaderName, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use reqwest::{redirect::Policy, Client};
use tracing::{debug, error, instrument};
use url::Url;

/// Largest request body relayed upstream.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Upstream {
    base: Url,
    client: Client,
}

impl Upstream {
    /// # Errors
    /// Returns an error if the URL is not http(s) or the HTTP client cannot be built.
    pub fn new(base: Url) -> Result<Self> {
        if !matches!(base.scheme(), "http" | "https") {
            anyhow::bail!("unsupported upstream scheme: {}", base.scheme());
        }

        // Redirects are answered by the browser, not followed here.
        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .redirect(Policy::none())
            .build()
            .context("Failed to build upstream HTTP client")?;

        Ok(Self { base, client })
    }

    #[must_use]
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Upstream URL for an incoming request URI, keeping path and query.
    ///
    /// # Errors
    /// Returns an error if the joined URL does not parse.
    pub fn target(&self, uri: &Uri) -> Result<Url> {
        let path_and_query = uri.path_and_query().map_or("/", |pq| pq.as_str());
        let base = self.base.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}{path_and_query}"))
            .with_context(|| format!("invalid upstream target for {path_and_query}"))
    }
}

fn is_hop_by_hop(name: &HeaderName) -> bool {
    matches!(
        name.as_str(),
        "connection"
            | "keep-alive"
            | "proxy-authenticate"
            | "proxy-authorization"
            | "te"
            | "trailer"
            | "transfer-encoding"
            | "upgrade"
    )
}

fn forwarded_headers(headers: &HeaderMap) -> HeaderMap {
    let mut out = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        if is_hop_by_hop(name) || name == header::HOST || name == header::CONTENT_LENGTH {
            continue;
        }
        out.append(name.clone(), value.clone());
    }
    out
}

/// Fallback handler relaying every request that reaches it.
#[instrument(skip_all, fields(http.target = %request.uri()))]
pub async fn forward(State(upstream): State<Upstream>, request: Request) -> Response {
    let target = match upstream.target(request.uri()) {
        Ok(target) => target,
        Err(err) => {
            error!("{err:#}");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    let (parts, body) = request.into_parts();

    let body = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(body) => body,
        Err(err) => {
            debug!("Failed to buffer request body: {err}");
            return StatusCode::PAYLOAD_TOO_LARGE.into_response();
        }
    };

    let response = match upstream
        .client
        .request(parts.method, target.clone())
        .headers(forwarded_headers(&parts.headers))
        .body(body)
        .send()
        .await
    {
        Ok(response) => response,
        Err(err) => {
            error!("Upstream request to {target} failed: {err}");
            return (StatusCode::BAD_GATEWAY, "Bad Gateway").into_response();
        }
    };

    debug!("Upstream {} answered {}", target, response.status());

    let mut builder = Response::builder().status(response.status());
    if let Some(headers) = builder.headers_mut() {
        for (name, value) in response.headers() {
            if !is_hop_by_hop(name) {
                headers.append(name.clone(), value.clone());
            }
        }
    }

    match builder.body(Body::from_stream(response.bytes_stream())) {
        Ok(response) => response,
        Err(err) => {
            error!("Failed to build upstream response: {err}");
            (StatusCode::BAD_GATEWAY, "Bad Gateway").into_response()
        }
    }
}
