//! Request middleware: CORS and the service version header
use axum::middleware::Next;
use axum::{body::Body, http::HeaderValue, http::Request, response::Response};
use permit_core::PERMIT_VERSION;
use tower_http::cors::CorsLayer;

pub const VERSION_HEADER: &str = "x-permit-version";

pub fn cors() -> CorsLayer {
    CorsLayer::permissive()
}

/// Stamp every response with the service version.
pub async fn version_header(req: Request<Body>, next: Next) -> Response {
    let mut response = next.run(req).await;
    response
        .headers_mut()
        .insert(VERSION_HEADER, HeaderValue::from_static(PERMIT_VERSION));
    response
}
