use std::sync::Arc;

use hyper::Client;
use tokio::sync::RwLock;
use tracing_subscriber::EnvFilter;
use web_proxy::{routes, AppState, ProxyConfig};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match ProxyConfig::load() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(%err, "failed to load configuration");
            std::process::exit(1);
        }
    };

    let port = config.local_port;
    tracing::info!(
        upstream = %format!("{}:{}", config.upstream_host, config.upstream_port),
        max_requests = config.max_requests,
        cache_size_kb = config.cache_size_kb,
        freshness_secs = config.freshness_secs,
        "starting web proxy"
    );

    let state = Arc::new(RwLock::new(AppState::new(&config)));
    let client = Client::new();
    let routes = routes(Arc::new(config), state, client);

    tracing::info!("server running on port {}", port);
    warp::serve(routes).run(([127, 0, 0, 1], port)).await;
}
