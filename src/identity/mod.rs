use hyper::header::COOKIE;
use hyper::HeaderMap;

#[cfg(test)]
mod tests;

pub const IDENTITY_COOKIE: &str = "webproxy";
pub const BAN_COOKIE: &str = "webproxyBanned";
pub const BAN_VALUE: &str = "BANNED";
pub const TOKEN_TTL_SECS: u64 = 60 * 10;

/// Reads the identity token from the request cookies. Missing or malformed
/// tokens are equivalent to no identity at all.
pub fn parse_identity(headers: &HeaderMap) -> Option<u64> {
    cookie_value(headers, IDENTITY_COOKIE)?.parse().ok()
}

/// The ban marker short-circuits all other processing; its value is not
/// inspected, only its presence.
pub fn has_ban_marker(headers: &HeaderMap) -> bool {
    cookie_value(headers, BAN_COOKIE).is_some()
}

pub fn identity_cookie(id: u64) -> String {
    format!("{}={}; Max-Age={}", IDENTITY_COOKIE, id, TOKEN_TTL_SECS)
}

pub fn ban_cookie() -> String {
    format!("{}={}", BAN_COOKIE, BAN_VALUE)
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    for header in headers.get_all(COOKIE) {
        let raw = match header.to_str() {
            Ok(raw) => raw,
            Err(_) => continue,
        };
        for pair in raw.split(';') {
            if let Some((n, v)) = pair.trim().split_once('=') {
                if n == name {
                    return Some(v.to_string());
                }
            }
        }
    }
    None
}
