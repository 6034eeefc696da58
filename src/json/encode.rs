//! JSON response writing
//!
//! All JSON responses share the `{error, message, data?}` envelope.

use crate::error::{Result, ToolkitError};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use hyper::{Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Uniform JSON wrapper for success and failure responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonResponse {
    pub error: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl JsonResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            error: false,
            message: message.into(),
            data: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            error: true,
            message: message.into(),
            data: None,
        }
    }

    /// Attach a serializable payload as `data`
    pub fn with_data<T: Serialize + ?Sized>(mut self, data: &T) -> Result<Self> {
        self.data =
            Some(serde_json::to_value(data).map_err(|e| ToolkitError::Serialize(e.to_string()))?);
        Ok(self)
    }
}

/// Serialize `payload` into a JSON response
///
/// The payload is serialized before anything else, so a failure produces no
/// response at all. Extra headers are copied verbatim; `Content-Type` is always
/// `application/json`.
pub fn write_json<T: Serialize + ?Sized>(
    status: StatusCode,
    payload: &T,
    extra_headers: Option<&HeaderMap>,
) -> Result<Response<Full<Bytes>>> {
    let body = serde_json::to_vec(payload).map_err(|e| ToolkitError::Serialize(e.to_string()))?;

    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;

    let headers = response.headers_mut();
    if let Some(extra) = extra_headers {
        for (name, value) in extra {
            headers.append(name.clone(), value.clone());
        }
    }
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    Ok(response)
}

/// Write `err` as a failure envelope, 400 unless `status` is given
pub fn error_json<E: Display + ?Sized>(
    err: &E,
    status: Option<StatusCode>,
) -> Result<Response<Full<Bytes>>> {
    let payload = JsonResponse::failure(err.to_string());
    write_json(status.unwrap_or(StatusCode::BAD_REQUEST), &payload, None)
}
