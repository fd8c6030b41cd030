use crate::cache::ResponseCache;
use crate::config::ProxyConfig;
use crate::limiter::RateLimiterState;

/// Process-wide singletons: the response cache and the rate-limiter table.
/// Both live for the life of the process; nothing is persisted.
pub struct AppState {
    pub cache: ResponseCache,
    pub limiter: RateLimiterState,
}

impl AppState {
    pub fn new(config: &ProxyConfig) -> Self {
        Self {
            cache: ResponseCache::new(config.capacity_bytes(), config.freshness()),
            limiter: RateLimiterState::new(config.max_requests),
        }
    }
}
