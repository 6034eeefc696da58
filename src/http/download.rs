//! Static file download module
//!
//! Streams a file from disk as an attachment so browsers save it instead of
//! rendering it.

use crate::error::{Result, ToolkitError};
use crate::http::mime;
use crate::http::response::BoxedBody;
use crate::logger;
use futures_util::TryStreamExt;
use http_body_util::{BodyExt, StreamBody};
use hyper::body::Frame;
use hyper::header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE};
use hyper::{Response, StatusCode};
use std::io;
use std::path::Path;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

/// Build a response that streams `path` verbatim under `display_name`
///
/// Sets `Content-Disposition: attachment; filename="<display_name>"` and the
/// exact `Content-Length`. A missing file surfaces as an I/O `NotFound`.
pub async fn download_static_file(
    path: impl AsRef<Path>,
    display_name: &str,
) -> Result<Response<BoxedBody>> {
    let path = path.as_ref();
    let file = File::open(path).await?;
    let metadata = file.metadata().await?;
    if !metadata.is_file() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} is not a regular file", path.display()),
        )
        .into());
    }
    let size = metadata.len();

    let stream = ReaderStream::new(file).map_ok(Frame::data);
    let body = StreamBody::new(stream).boxed();

    logger::log_download(path, size);

    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, mime::content_type_for_name(display_name))
        .header(CONTENT_LENGTH, size)
        .header(CONTENT_DISPOSITION, attachment_disposition(display_name))
        .body(body)
        .map_err(|e| ToolkitError::Io(io::Error::new(io::ErrorKind::InvalidInput, e)))
}

/// Quote a file name for the Content-Disposition header
fn attachment_disposition(display_name: &str) -> String {
    let mut quoted = String::with_capacity(display_name.len());
    for c in display_name.chars().filter(|c| !c.is_control()) {
        if matches!(c, '"' | '\\') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    format!("attachment; filename=\"{quoted}\"")
}
