pub mod admin;
pub mod cache;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod identity;
pub mod limiter;
pub mod models;
pub mod proxy;
pub mod routes;

pub use cache::{CacheEntry, ResponseCache};
pub use config::ProxyConfig;
pub use errors::ProxyError;
pub use limiter::{Admission, ClientIdentity, RateLimiterState};
pub use models::AppState;
pub use routes::routes;
