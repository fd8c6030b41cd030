use std::fmt;

#[derive(Debug)]
pub enum ProxyError {
    InvalidUri(String),
    Http(String),
    MethodNotAllowed,
    QuotaExceeded { newly_banned: bool },
    UpstreamTimeout,
    UpstreamUnavailable(String),
}

impl fmt::Display for ProxyError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::InvalidUri(e) => write!(f, "Invalid URI: {}", e),
            Self::Http(e) => write!(f, "HTTP Error: {}", e),
            Self::MethodNotAllowed => write!(f, "Request method is not allowed"),
            Self::QuotaExceeded { .. } => write!(f, "Request quota exceeded"),
            Self::UpstreamTimeout => write!(f, "Upstream request timed out"),
            Self::UpstreamUnavailable(e) => write!(f, "Upstream unavailable: {}", e),
        }
    }
}
