//! Request routing dispatch module
//!
//! Maps each demo endpoint onto one toolkit helper and turns toolkit errors
//! into JSON error envelopes.

use super::AppState;
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response, StatusCode};
use rust_webtools::http::response::build_fallback_response;
use rust_webtools::http::{download_static_file, into_boxed_response, BoxedBody};
use rust_webtools::upload::namer::base_name;
use rust_webtools::{
    decode_request, error_json, logger, slugify, write_json, JsonResponse, Result, ToolkitError,
    UploadPipeline,
};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::io;
use std::sync::Arc;
use std::time::Instant;

const DOWNLOAD_PREFIX: &str = "/download/";

#[derive(Debug, Serialize, Deserialize)]
struct EchoPayload {
    message: String,
}

#[derive(Debug, Deserialize)]
struct SlugRequest {
    text: String,
}

#[derive(Debug, Serialize)]
struct SlugResponse {
    slug: String,
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
) -> std::result::Result<Response<BoxedBody>, Infallible>
where
    B: Body<Data = Bytes> + Send,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let started = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = route_request(req, &state)
        .await
        .unwrap_or_else(|e| error_response(&e));

    if state.config.logging.access_log {
        logger::log_request(
            method.as_str(),
            &path,
            response.status().as_u16(),
            started.elapsed(),
        );
    }
    Ok(response)
}

async fn route_request<B>(req: Request<B>, state: &AppState) -> Result<Response<BoxedBody>>
where
    B: Body<Data = Bytes> + Send,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let path = req.uri().path().to_string();
    match (req.method(), path.as_str()) {
        (&Method::POST, "/upload") => {
            let files = UploadPipeline::new(state.config.upload.clone())
                .upload_files(req)
                .await?;
            let payload = JsonResponse::success(format!("{} file(s) uploaded", files.len()))
                .with_data(&files)?;
            ok_json(&payload)
        }
        (&Method::POST, "/upload-one") => {
            let file = UploadPipeline::new(state.config.upload.clone())
                .upload_one_file(req)
                .await?;
            let payload = JsonResponse::success("file uploaded").with_data(&file)?;
            ok_json(&payload)
        }
        (&Method::POST, "/echo") => {
            let echo: EchoPayload = decode_request(req, &state.config.json).await?;
            ok_json(&JsonResponse::success("received").with_data(&echo)?)
        }
        (&Method::POST, "/slug") => {
            let request: SlugRequest = decode_request(req, &state.config.json).await?;
            let slug = slugify(&request.text)?;
            ok_json(&JsonResponse::success("slug generated").with_data(&SlugResponse { slug })?)
        }
        (&Method::GET, p) if p.starts_with(DOWNLOAD_PREFIX) => {
            serve_download(&p[DOWNLOAD_PREFIX.len()..], state).await
        }
        _ => Ok(not_found()),
    }
}

/// Stream `<upload dir>/<name>`; only the final path component of `name` is used
async fn serve_download(name: &str, state: &AppState) -> Result<Response<BoxedBody>> {
    let Some(name) = base_name(name) else {
        return Ok(not_found());
    };
    let path = state.config.upload.directory.join(name);
    match download_static_file(&path, name).await {
        Err(ToolkitError::Io(e)) if e.kind() == io::ErrorKind::NotFound => Ok(not_found()),
        other => other,
    }
}

fn ok_json(payload: &JsonResponse) -> Result<Response<BoxedBody>> {
    write_json(StatusCode::OK, payload, None).map(into_boxed_response)
}

fn not_found() -> Response<BoxedBody> {
    let response = error_json("resource not found", Some(StatusCode::NOT_FOUND))
        .unwrap_or_else(|e| build_fallback_response("404", &e));
    into_boxed_response(response)
}

fn error_response(err: &ToolkitError) -> Response<BoxedBody> {
    let status = err.kind().status();
    if status.is_server_error() {
        logger::log_error(&err.to_string());
    }
    let response =
        error_json(err, Some(status)).unwrap_or_else(|e| build_fallback_response("error", &e));
    into_boxed_response(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::{BodyExt, Full};
    use hyper::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
    use rust_webtools::config::{LoggingConfig, ServerConfig};
    use rust_webtools::{JsonDecodeConfig, ToolkitConfig, UploadConfig};
    use std::path::Path;

    fn state(upload_dir: &Path) -> Arc<AppState> {
        Arc::new(AppState::new(ToolkitConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                read_timeout: 5,
                workers: None,
            },
            upload: UploadConfig::new(upload_dir).with_rename(false),
            json: JsonDecodeConfig::default(),
            logging: LoggingConfig {
                level: "error".to_string(),
                access_log: false,
                access_log_file: None,
                error_log_file: None,
            },
        }))
    }

    fn json_post(path: &str, body: &'static str) -> Request<Full<Bytes>> {
        Request::post(path)
            .header(CONTENT_TYPE, "application/json")
            .body(Full::new(Bytes::from_static(body.as_bytes())))
            .unwrap()
    }

    async fn envelope(response: Response<BoxedBody>) -> JsonResponse {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_slug_route() {
        let dir = tempfile::tempdir().unwrap();
        let response = handle_request(json_post("/slug", r#"{"text":" Now is the time "}"#), state(dir.path()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = envelope(response).await;
        assert!(!body.error);
        assert_eq!(body.data.unwrap()["slug"], "now-is-the-time");
    }

    #[tokio::test]
    async fn test_slug_route_empty_result() {
        let dir = tempfile::tempdir().unwrap();
        let response = handle_request(json_post("/slug", r#"{"text":"こんにちは"}"#), state(dir.path()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(envelope(response).await.error);
    }

    #[tokio::test]
    async fn test_echo_route() {
        let dir = tempfile::tempdir().unwrap();
        let response = handle_request(json_post("/echo", r#"{"message":"hi"}"#), state(dir.path()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(envelope(response).await.data.unwrap()["message"], "hi");
    }

    #[tokio::test]
    async fn test_echo_rejects_unknown_field() {
        let dir = tempfile::tempdir().unwrap();
        let response = handle_request(
            json_post("/echo", r#"{"message":"hi","extra":1}"#),
            state(dir.path()),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = envelope(response).await;
        assert!(body.error);
        assert_eq!(body.message, "body contains unknown key \"extra\"");
    }

    #[tokio::test]
    async fn test_upload_then_download() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(dir.path());
        let boundary = "route-test";
        let body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"note.txt\"\r\n\r\nhello there\r\n--{boundary}--\r\n"
        );
        let req = Request::post("/upload-one")
            .header(CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"))
            .body(Full::new(Bytes::from(body)))
            .unwrap();

        let response = handle_request(req, Arc::clone(&state)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let uploaded = envelope(response).await.data.unwrap();
        assert_eq!(uploaded["new_name"], "note.txt");
        assert_eq!(uploaded["size_bytes"], 11);

        let req = Request::get("/download/note.txt")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let response = handle_request(req, state).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[CONTENT_DISPOSITION],
            "attachment; filename=\"note.txt\""
        );
        let content = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&content[..], b"hello there");
    }

    #[tokio::test]
    async fn test_download_missing_file_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let req = Request::get("/download/nope.bin")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let response = handle_request(req, state(dir.path())).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let req = Request::get("/nowhere").body(Full::new(Bytes::new())).unwrap();
        let response = handle_request(req, state(dir.path())).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = envelope(response).await;
        assert!(body.error);
        assert_eq!(body.message, "resource not found");
    }
}
