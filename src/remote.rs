//! Remote JSON push
//!
//! Serializes a payload and POSTs it to another service. The transport is the
//! `RemoteClient` trait so callers can plug in their own client.

use crate::error::{Result, ToolkitError};
use crate::logger;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::header::CONTENT_TYPE;
use hyper::{Request, Response, StatusCode};
use hyper_util::client::legacy::connect::{Connect, HttpConnector};
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use serde::Serialize;
use std::future::Future;

/// HTTP transport used by `push_json_to_remote`
pub trait RemoteClient {
    /// Send `req` and return the response with its body fully read
    fn send(
        &self,
        req: Request<Full<Bytes>>,
    ) -> impl Future<Output = Result<Response<Bytes>>> + Send;
}

impl<C> RemoteClient for Client<C, Full<Bytes>>
where
    C: Connect + Clone + Send + Sync + 'static,
{
    fn send(
        &self,
        req: Request<Full<Bytes>>,
    ) -> impl Future<Output = Result<Response<Bytes>>> + Send {
        let pending = self.request(req);
        async move {
            let response = pending
                .await
                .map_err(|e| ToolkitError::Transport(e.to_string()))?;
            let (parts, body) = response.into_parts();
            let body = body
                .collect()
                .await
                .map_err(|e| ToolkitError::Transport(e.to_string()))?
                .to_bytes();
            Ok(Response::from_parts(parts, body))
        }
    }
}

/// Plain-HTTP client on the tokio runtime
pub fn http_client() -> Client<HttpConnector, Full<Bytes>> {
    Client::builder(TokioExecutor::new()).build_http()
}

/// POST `payload` as JSON to `uri`, returning the response status and body
pub async fn push_json_to_remote<T, C>(uri: &str, payload: &T, client: &C) -> Result<(StatusCode, Bytes)>
where
    T: Serialize + ?Sized,
    C: RemoteClient,
{
    let body = serde_json::to_vec(payload).map_err(|e| ToolkitError::Serialize(e.to_string()))?;
    let req = Request::post(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from(body)))
        .map_err(|e| ToolkitError::Transport(format!("invalid request for {uri}: {e}")))?;

    let response = client.send(req).await?;
    let status = response.status();
    logger::log_remote_push(uri, status.as_u16());
    Ok((status, response.into_body()))
}
