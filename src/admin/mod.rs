use std::collections::HashMap;
use std::sync::Arc;
use std::time::SystemTime;

use bytes::Bytes;
use hyper::{Body, Method, Response, StatusCode};
use lazy_static::lazy_static;
use regex::Regex;
use tokio::sync::RwLock;

use crate::handlers::html_page;
use crate::models::AppState;


lazy_static! {
    // Admin commands are exactly five lowercase letters (reset, cache).
    static ref COMMAND_PATTERN: Regex = Regex::new("^[a-z]{5}$").unwrap();
}

/// Handles one `/admin/<command>` request. The admin side-channel is not
/// gated by the identity issuer or the rate limiter.
pub async fn handle(
    command: String,
    method: Method,
    params: HashMap<String, String>,
    state: Arc<RwLock<AppState>>,
) -> Result<Response<Body>, warp::Rejection> {
    if !COMMAND_PATTERN.is_match(&command) {
        return Ok(invalid_request());
    }

    let now = SystemTime::now();
    let response = match (&method, command.as_str()) {
        (&Method::POST, "reset") => {
            let mut state = state.write().await;
            state.cache.reset();
            tracing::info!("admin: cache reset");
            acknowledge("Success resetting cache")
        }
        (&Method::DELETE, "cache") => match params.get("key") {
            Some(key) => {
                let mut state = state.write().await;
                if state.cache.delete(key) {
                    tracing::info!(key = %key, "admin: deleted cache entry");
                    acknowledge("Successfully deleted")
                } else {
                    not_found()
                }
            }
            None => not_found(),
        },
        (&Method::GET, "cache") => {
            let entry = match params.get("key") {
                Some(key) => state.write().await.cache.get(key, now),
                None => None,
            };
            match entry {
                Some(entry) => Response::builder()
                    .status(entry.status)
                    .header("content-type", entry.content_type.as_str())
                    .body(Body::from(entry.body))
                    .unwrap(),
                None => not_found(),
            }
        }
        (&Method::PUT, "cache") => match (params.get("key"), params.get("value")) {
            (Some(key), Some(value)) => {
                let mut state = state.write().await;
                state.cache.put(
                    key.clone(),
                    Bytes::from(value.clone()),
                    "text/plain".to_string(),
                    StatusCode::OK,
                    now,
                );
                tracing::info!(key = %key, "admin: stored cache entry");
                acknowledge("Success updating object")
            }
            _ => invalid_request(),
        },
        _ => invalid_request(),
    };
    Ok(response)
}

fn acknowledge(message: &str) -> Response<Body> {
    html(StatusCode::OK, message)
}

fn not_found() -> Response<Body> {
    html(StatusCode::NOT_FOUND, "Object does not exist")
}

fn invalid_request() -> Response<Body> {
    html(StatusCode::UNAUTHORIZED, "Invalid request")
}

fn html(code: StatusCode, message: &str) -> Response<Body> {
    Response::builder()
        .status(code)
        .header("content-type", "text/html")
        .body(Body::from(html_page(message)))
        .unwrap()
}
