#[cfg(test)]
mod tests {
    use hyper::header::COOKIE;
    use hyper::HeaderMap;

    use crate::identity::{
        ban_cookie, has_ban_marker, identity_cookie, parse_identity,
    };

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, value.parse().unwrap());
        headers
    }

    #[test]
    fn test_parse_identity_cookie() {
        let headers = headers_with_cookie("webproxy=7");
        assert_eq!(parse_identity(&headers), Some(7));
    }

    #[test]
    fn test_parse_among_multiple_cookies() {
        let headers = headers_with_cookie("foo=bar; webproxy=3; other=x");
        assert_eq!(parse_identity(&headers), Some(3));
    }

    #[test]
    fn test_missing_token() {
        assert_eq!(parse_identity(&HeaderMap::new()), None);
    }

    #[test]
    fn test_malformed_token() {
        let headers = headers_with_cookie("webproxy=abc");
        assert_eq!(parse_identity(&headers), None);
    }

    #[test]
    fn test_ban_marker_detection() {
        let headers = headers_with_cookie("webproxyBanned=BANNED");
        assert!(has_ban_marker(&headers));
        assert!(!has_ban_marker(&HeaderMap::new()));
    }

    #[test]
    fn test_ban_marker_does_not_match_identity_cookie() {
        let headers = headers_with_cookie("webproxy=4");
        assert!(!has_ban_marker(&headers));
    }

    #[test]
    fn test_identity_cookie_format() {
        assert_eq!(identity_cookie(9), "webproxy=9; Max-Age=600");
    }

    #[test]
    fn test_ban_cookie_format() {
        assert_eq!(ban_cookie(), "webproxyBanned=BANNED");
    }
}
