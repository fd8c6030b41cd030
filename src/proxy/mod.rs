use std::sync::Arc;
use std::time::SystemTime;

use bytes::Bytes;
use hyper::client::HttpConnector;
use hyper::header::{CONTENT_LENGTH, CONTENT_TYPE, LOCATION, SET_COOKIE};
use hyper::{Body, Client, HeaderMap, Method, Request, Response, StatusCode, Uri};
use tokio::sync::RwLock;
use tokio::time::timeout;
use warp::path::FullPath;

use crate::cache::CacheEntry;
use crate::config::ProxyConfig;
use crate::errors::ProxyError;
use crate::handlers::error_response;
use crate::identity;
use crate::limiter::Admission;
use crate::models::AppState;

#[cfg(test)]
mod tests;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// A fully buffered upstream response, reduced to the parts the proxy
/// forwards: status, content type, redirect target, body.
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub content_type: String,
    pub location: Option<String>,
    pub body: Bytes,
}

/// Handles one proxied request end to end: ban marker, admission, then GET
/// via the cache or POST straight through. Whatever response comes out, a
/// freshly minted identity token is attached to it.
pub async fn handle(
    method: Method,
    headers: HeaderMap,
    full_path: FullPath,
    query: String,
    body: Bytes,
    config: Arc<ProxyConfig>,
    state: Arc<RwLock<AppState>>,
    client: Client<HttpConnector>,
) -> Result<Response<Body>, warp::Rejection> {
    let started = SystemTime::now();

    if identity::has_ban_marker(&headers) {
        return Ok(error_response(&ProxyError::QuotaExceeded {
            newly_banned: false,
        }));
    }

    let token = identity::parse_identity(&headers);
    let admission = state.write().await.limiter.admit(token, started);
    let minted = match admission {
        Admission::Reject { newly_banned } => {
            return Ok(error_response(&ProxyError::QuotaExceeded { newly_banned }));
        }
        Admission::Allow { minted } => minted,
    };

    let key = cache_key(full_path.as_str(), &query);
    let outcome = match method {
        Method::GET => forward_get(&key, &config, &state, &client).await,
        Method::POST => {
            let content_type = headers
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            forward_post(&key, content_type, body, &config, &client).await
        }
        _ => Err(ProxyError::MethodNotAllowed),
    };

    let mut response = match outcome {
        Ok(response) => response,
        Err(err) => {
            tracing::warn!(%err, path = %key, "request failed");
            error_response(&err)
        }
    };

    if let Some(id) = minted {
        if let Ok(value) = identity::identity_cookie(id).parse() {
            response.headers_mut().append(SET_COOKIE, value);
        }
    }

    if let Ok(duration) = started.elapsed() {
        tracing::info!(
            "{} {} {} {}ms",
            method,
            key,
            response.status(),
            duration.as_millis()
        );
    }

    Ok(response)
}

async fn forward_get(
    key: &str,
    config: &ProxyConfig,
    state: &Arc<RwLock<AppState>>,
    client: &Client<HttpConnector>,
) -> Result<Response<Body>, ProxyError> {
    {
        let mut state = state.write().await;
        if let Some(entry) = state.cache.get(key, SystemTime::now()) {
            tracing::debug!(key, "cache hit");
            return Ok(cached_response(entry));
        }
    }
    tracing::debug!(key, "cache miss");

    let upstream = fetch_upstream(client, config, Method::GET, key, None, Bytes::new()).await?;
    if is_redirect(upstream.status) {
        return Ok(redirect_response(&upstream, config));
    }

    let mut state = state.write().await;
    state.cache.put(
        key.to_string(),
        upstream.body.clone(),
        upstream.content_type.clone(),
        upstream.status,
        SystemTime::now(),
    );
    Ok(upstream_response(upstream))
}

async fn forward_post(
    key: &str,
    content_type: Option<String>,
    body: Bytes,
    config: &ProxyConfig,
    client: &Client<HttpConnector>,
) -> Result<Response<Body>, ProxyError> {
    let upstream = fetch_upstream(client, config, Method::POST, key, content_type, body).await?;
    if is_redirect(upstream.status) {
        return Ok(redirect_response(&upstream, config));
    }
    Ok(upstream_response(upstream))
}

async fn fetch_upstream(
    client: &Client<HttpConnector>,
    config: &ProxyConfig,
    method: Method,
    path_and_query: &str,
    content_type: Option<String>,
    body: Bytes,
) -> Result<UpstreamResponse, ProxyError> {
    let uri = upstream_uri(config, path_and_query)?;
    let is_post = method == Method::POST;

    let mut builder = Request::builder().method(method).uri(uri);
    if is_post {
        builder = builder.header(CONTENT_LENGTH, body.len());
        if let Some(content_type) = content_type {
            builder = builder.header(CONTENT_TYPE, content_type);
        }
    }
    let request = builder
        .body(Body::from(body))
        .map_err(|e| ProxyError::Http(e.to_string()))?;

    let response = match timeout(config.upstream_timeout(), client.request(request)).await {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => return Err(ProxyError::UpstreamUnavailable(e.to_string())),
        Err(_) => return Err(ProxyError::UpstreamTimeout),
    };

    let (parts, body) = response.into_parts();
    let content_type = parts
        .headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(FALLBACK_CONTENT_TYPE)
        .to_string();
    let location = parts
        .headers
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = hyper::body::to_bytes(body)
        .await
        .map_err(|e| ProxyError::UpstreamUnavailable(e.to_string()))?;

    Ok(UpstreamResponse {
        status: parts.status,
        content_type,
        location,
        body,
    })
}

/// The cache key is the request path plus the query string, verbatim.
pub fn cache_key(path: &str, query: &str) -> String {
    if query.is_empty() {
        path.to_string()
    } else {
        format!("{}?{}", path, query)
    }
}

pub fn upstream_uri(config: &ProxyConfig, path_and_query: &str) -> Result<Uri, ProxyError> {
    format!(
        "http://{}:{}{}",
        config.upstream_host, config.upstream_port, path_and_query
    )
    .parse()
    .map_err(|e: hyper::http::uri::InvalidUri| ProxyError::InvalidUri(e.to_string()))
}

pub fn is_redirect(status: StatusCode) -> bool {
    matches!(status.as_u16(), 301 | 302 | 303 | 307 | 308)
}

/// Redirect bodies are not replayed; the client is sent to the upstream's
/// own Location target, falling back to the upstream hostname when the
/// header is missing.
pub fn redirect_response(upstream: &UpstreamResponse, config: &ProxyConfig) -> Response<Body> {
    let target = upstream
        .location
        .clone()
        .unwrap_or_else(|| config.upstream_host.clone());
    Response::builder()
        .status(upstream.status)
        .header(LOCATION, target)
        .body(Body::empty())
        .unwrap()
}

pub fn cached_response(entry: CacheEntry) -> Response<Body> {
    Response::builder()
        .status(entry.status)
        .header(CONTENT_TYPE, entry.content_type.as_str())
        .body(Body::from(entry.body))
        .unwrap()
}

fn upstream_response(upstream: UpstreamResponse) -> Response<Body> {
    Response::builder()
        .status(upstream.status)
        .header(CONTENT_TYPE, upstream.content_type.as_str())
        .body(Body::from(upstream.body))
        .unwrap()
}
