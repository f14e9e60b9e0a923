//! Response caching headers
//!
//! Successful reads may be kept by the browser for the configured max-age.
//! Writes and every non-2xx response are `no-store`, so a cached 401 never
//! outlives a fresh login.

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderValue, Method, Request, header};
use axum::middleware::Next;
use axum::response::Response;
use std::sync::Arc;

use crate::application::config::CatalogConfig;

pub async fn cache_control(
    State(config): State<Arc<CatalogConfig>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let is_read = matches!(*req.method(), Method::GET | Method::HEAD);
    let mut response = next.run(req).await;

    if response.headers().contains_key(header::CACHE_CONTROL) {
        return response;
    }

    let value = if is_read && response.status().is_success() {
        HeaderValue::from_str(&config.read_cache_control())
            .unwrap_or_else(|_| HeaderValue::from_static("no-store"))
    } else {
        HeaderValue::from_static("no-store")
    };
    response.headers_mut().insert(header::CACHE_CONTROL, value);

    response
}
