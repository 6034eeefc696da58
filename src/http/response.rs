//! HTTP response body helpers
//!
//! JSON helpers produce `Full<Bytes>` bodies while downloads stream, so the
//! demo server unifies both under a boxed body type.

use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::Response;

/// Body type shared by streamed and buffered responses
pub type BoxedBody = BoxBody<Bytes, std::io::Error>;

/// Box a buffered body
pub fn full_body(data: impl Into<Bytes>) -> BoxedBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed()
}

/// Convert a buffered response into the boxed body type
pub fn into_boxed_response(response: Response<Full<Bytes>>) -> Response<BoxedBody> {
    response.map(|body| body.map_err(|never| match never {}).boxed())
}

/// Empty 500 used when the JSON envelope itself cannot be produced
pub fn build_fallback_response(context: &str, error: &dyn std::fmt::Display) -> Response<Full<Bytes>> {
    crate::logger::log_error(&format!("Failed to build {context} response: {error}"));
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = hyper::StatusCode::INTERNAL_SERVER_ERROR;
    response
}
