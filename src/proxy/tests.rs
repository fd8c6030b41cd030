#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use bytes::Bytes;
    use hyper::StatusCode;

    use crate::config::ProxyConfig;
    use crate::proxy::{
        cache_key, is_redirect, redirect_response, upstream_uri, UpstreamResponse,
    };

    fn config() -> ProxyConfig {
        ProxyConfig {
            upstream_host: "example.com".to_string(),
            upstream_port: 8080,
            ..ProxyConfig::default()
        }
    }

    fn upstream(status: StatusCode, location: Option<&str>) -> UpstreamResponse {
        UpstreamResponse {
            status,
            content_type: "text/html".to_string(),
            location: location.map(str::to_string),
            body: Bytes::from("ignored"),
        }
    }

    #[test]
    fn test_cache_key_without_query() {
        assert_eq!(cache_key("/x", ""), "/x");
    }

    #[test]
    fn test_cache_key_with_query() {
        assert_eq!(cache_key("/x", "a=1&b=2"), "/x?a=1&b=2");
    }

    #[test]
    fn test_is_redirect() {
        for code in [301u16, 302, 303, 307, 308] {
            assert!(is_redirect(StatusCode::from_u16(code).unwrap()));
        }
        assert!(!is_redirect(StatusCode::OK));
        assert!(!is_redirect(StatusCode::NOT_FOUND));
        assert!(!is_redirect(StatusCode::NOT_MODIFIED));
    }

    #[test]
    fn test_upstream_uri() {
        let uri = upstream_uri(&config(), "/x?a=1").unwrap();
        assert_eq!(uri.to_string(), "http://example.com:8080/x?a=1");
    }

    #[test]
    fn test_redirect_uses_upstream_location() {
        let resp = redirect_response(
            &upstream(StatusCode::FOUND, Some("http://elsewhere/x")),
            &config(),
        );
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(resp.headers().get("location").unwrap(), "http://elsewhere/x");
    }

    #[test]
    fn test_redirect_falls_back_to_upstream_host() {
        let resp = redirect_response(&upstream(StatusCode::MOVED_PERMANENTLY, None), &config());
        assert_eq!(resp.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(resp.headers().get("location").unwrap(), "example.com");
    }

    #[test]
    fn test_redirect_body_not_replayed() {
        let resp = redirect_response(&upstream(StatusCode::FOUND, None), &config());
        assert!(resp.headers().get("content-type").is_none());
    }

    #[test]
    fn test_cached_response_round_trip() {
        let entry = crate::cache::CacheEntry {
            body: Bytes::from("hello"),
            content_type: "text/plain".to_string(),
            status: StatusCode::OK,
            inserted_at: SystemTime::now(),
        };
        let resp = crate::proxy::cached_response(entry);
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get("content-type").unwrap(), "text/plain");
    }
}
