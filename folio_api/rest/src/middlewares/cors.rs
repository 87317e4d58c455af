use axum::{
    http::{header, HeaderValue, Method},
    Router,
};
use tower_http::cors::CorsLayer;

/// Restrict cross-origin access to the configured frontend origin.
pub fn add<S: Clone + Send + Sync + 'static>(
    allowed_origin: HeaderValue,
) -> impl FnOnce(Router<S>) -> Router<S> {
    |router| {
        router.layer(
            CorsLayer::new()
                .allow_origin(allowed_origin)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([header::CONTENT_TYPE]),
        )
    }
}
