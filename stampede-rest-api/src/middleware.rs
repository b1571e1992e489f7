//! CORS middleware

use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};

/// CORS layer for a list of allowed origins; `*` allows any origin.
///
/// Origins that are not valid header values are logged and ignored.
pub fn cors_layer_with_config(allowed_origins: &[String]) -> CorsLayer {
    let mut cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            HeaderName::from_static("content-type"),
            HeaderName::from_static("accept"),
            HeaderName::from_static("x-requested-with"),
        ]);

    if allowed_origins.iter().any(|origin| origin == "*") {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|origin| match origin.parse::<HeaderValue>() {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::error!("Invalid origin '{}' in CORS configuration: {}", origin, e);
                    None
                }
            })
            .collect();
        cors = cors.allow_origin(origins);
    }

    cors
}
