use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;

use hyper::client::HttpConnector;
use hyper::Client;
use tokio::sync::RwLock;
use warp::{Filter, Reply};

use crate::admin;
use crate::config::ProxyConfig;
use crate::handlers::handle_rejection;
use crate::models::AppState;
use crate::proxy;

/// Assembles the full filter tree: the admin side-channel first, then the
/// catch-all forwarding route.
pub fn routes(
    config: Arc<ProxyConfig>,
    state: Arc<RwLock<AppState>>,
    client: Client<HttpConnector>,
) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    let state_filter = warp::any().map(move || state.clone());
    let config_filter = warp::any().map(move || config.clone());

    let admin = warp::path!("admin" / String)
        .and(warp::method())
        .and(warp::query::<HashMap<String, String>>().or_else(|_| async {
            Ok::<(HashMap<String, String>,), Infallible>((HashMap::new(),))
        }))
        .and(state_filter.clone())
        .and_then(admin::handle);

    let forward = warp::any()
        .and(warp::method())
        .and(warp::header::headers_cloned())
        .and(warp::path::full())
        .and(warp::query::raw().or_else(|_| async { Ok::<(String,), Infallible>((String::new(),)) }))
        .and(warp::body::bytes())
        .and(config_filter)
        .and(state_filter)
        .and(warp::any().map(move || client.clone()))
        .and_then(proxy::handle);

    admin.or(forward).recover(handle_rejection)
}
