//! `/api` path-rewrite passthrough to the inference service
//!
//! The gateway does not inspect or transform bodies: method, headers, and
//! body go upstream as received (minus the `/api` prefix and hop-by-hop
//! headers), and the upstream status, headers, and body come back verbatim.

use crate::AppState;
use axum::{
    body::Body,
    extract::{Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, warn};

/// Headers that are connection-scoped and must not be relayed
const HOP_BY_HOP_HEADERS: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailers",
    "transfer-encoding",
    "upgrade",
];

/// Gateway forwarding errors
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The upstream could not be reached (connect/transport failure)
    #[error("upstream unreachable: {0}")]
    Upstream(String),

    /// The inbound request could not be represented on the upstream leg
    #[error("malformed request: {0}")]
    BadRequest(String),

    /// Anything else
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ProxyError::Upstream(msg) => (StatusCode::BAD_GATEWAY, "BAD_GATEWAY", msg),
            ProxyError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ProxyError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg)
            }
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Forward one request to the upstream with the `/api` prefix removed
pub async fn forward(
    State(state): State<AppState>,
    req: Request,
) -> Result<Response, ProxyError> {
    let path_and_query = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let target = format!("{}{}", state.upstream, rewrite_path(path_and_query));

    let method = reqwest::Method::from_bytes(req.method().as_str().as_bytes())
        .map_err(|e| ProxyError::BadRequest(e.to_string()))?;

    debug!(method = %req.method(), upstream = %target, "forwarding request");

    let headers = upstream_request_headers(req.headers());
    let body = axum::body::to_bytes(req.into_body(), usize::MAX)
        .await
        .map_err(|e| ProxyError::BadRequest(e.to_string()))?;

    let upstream_response = state
        .http
        .request(method, &target)
        .headers(headers)
        .body(body)
        .send()
        .await
        .map_err(|e| {
            warn!(upstream = %target, error = %e, "upstream request failed");
            ProxyError::Upstream(e.to_string())
        })?;

    relay_response(upstream_response).await
}

/// Strip the `/api` prefix, keeping the query string intact.
///
/// `/api` and `/api?q` map to the upstream root.
fn rewrite_path(path_and_query: &str) -> String {
    let rest = path_and_query
        .strip_prefix("/api")
        .unwrap_or(path_and_query);
    match rest.chars().next() {
        None => "/".to_string(),
        Some('/') => rest.to_string(),
        Some(_) => format!("/{}", rest),
    }
}

/// Copy inbound headers onto the upstream request.
///
/// `Host` is regenerated by the client for the upstream origin, and
/// `Content-Length` is recomputed from the relayed body.
fn upstream_request_headers(headers: &axum::http::HeaderMap) -> reqwest::header::HeaderMap {
    let mut out = reqwest::header::HeaderMap::new();
    for (name, value) in headers {
        let name_str = name.as_str();
        if name_str == "host" || name_str == "content-length" {
            continue;
        }
        if HOP_BY_HOP_HEADERS.contains(&name_str) {
            continue;
        }
        if let (Ok(name), Ok(value)) = (
            reqwest::header::HeaderName::from_bytes(name_str.as_bytes()),
            reqwest::header::HeaderValue::from_bytes(value.as_bytes()),
        ) {
            out.append(name, value);
        }
    }
    out
}

/// Rebuild the upstream response as our own, status and headers intact
async fn relay_response(upstream: reqwest::Response) -> Result<Response, ProxyError> {
    let status = StatusCode::from_u16(upstream.status().as_u16())
        .map_err(|e| ProxyError::Internal(e.to_string()))?;

    let mut headers = axum::http::HeaderMap::new();
    for (name, value) in upstream.headers() {
        let name_str = name.as_str();
        if name_str == "content-length" || HOP_BY_HOP_HEADERS.contains(&name_str) {
            continue;
        }
        if let (Ok(name), Ok(value)) = (
            axum::http::HeaderName::from_bytes(name_str.as_bytes()),
            axum::http::HeaderValue::from_bytes(value.as_bytes()),
        ) {
            headers.append(name, value);
        }
    }

    let body = upstream
        .bytes()
        .await
        .map_err(|e| ProxyError::Upstream(e.to_string()))?;

    Ok((status, headers, Body::from(body)).into_response())
}
