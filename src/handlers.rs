use std::convert::Infallible;

use hyper::{Body, Response, StatusCode};

use crate::errors::ProxyError;
use crate::identity;


pub fn html_page(message: &str) -> String {
    format!("<html><head> MSG: </head><body>{}</body></html>", message)
}

/// Renders a request-level failure as the fixed HTML error page for its
/// status code. The ban marker cookie is attached exactly on the transition
/// into the banned state.
pub fn error_response(err: &ProxyError) -> Response<Body> {
    let (code, message) = match err {
        ProxyError::MethodNotAllowed => (
            StatusCode::METHOD_NOT_ALLOWED,
            "Request method is not allowed",
        ),
        ProxyError::QuotaExceeded { .. } => (
            StatusCode::METHOD_NOT_ALLOWED,
            "You maxed out your requests!",
        ),
        ProxyError::UpstreamTimeout => (StatusCode::GATEWAY_TIMEOUT, "Upstream request timed out"),
        ProxyError::UpstreamUnavailable(_) => {
            (StatusCode::BAD_GATEWAY, "Upstream server unavailable")
        }
        ProxyError::InvalidUri(_) | ProxyError::Http(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    };

    let mut builder = Response::builder()
        .status(code)
        .header("content-type", "text/html");
    if let ProxyError::QuotaExceeded { newly_banned: true } = err {
        builder = builder.header("set-cookie", identity::ban_cookie());
    }
    builder.body(Body::from(html_page(message))).unwrap()
}

/// Catches rejections that escape the filters themselves (the proxy route
/// matches every path, so this is mostly malformed-request fallout).
pub async fn handle_rejection(err: warp::Rejection) -> Result<impl warp::Reply, Infallible> {
    let (code, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Object does not exist")
    } else {
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    };

    Ok(warp::reply::with_status(
        warp::reply::html(html_page(message)),
        code,
    ))
}
