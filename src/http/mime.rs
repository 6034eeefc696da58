//! Download content type module
//!
//! Returns the Content-Type for a download based on the file name the client
//! will save it under.

use std::path::Path;

/// Get MIME Content-Type based on the extension of `file_name`
///
/// # Examples
/// ```
/// use rust_webtools::http::mime::content_type_for_name;
/// assert_eq!(content_type_for_name("report.PDF"), "application/pdf");
/// assert_eq!(content_type_for_name("puppy.jpg"), "image/jpeg");
/// assert_eq!(content_type_for_name("README"), "application/octet-stream");
/// ```
pub fn content_type_for_name(file_name: &str) -> &'static str {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        // Text
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("txt" | "md" | "log") => "text/plain; charset=utf-8",
        Some("csv") => "text/csv; charset=utf-8",
        Some("xml") => "text/xml; charset=utf-8",
        Some("json") => "application/json",

        // Images
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("webp") => "image/webp",

        // Audio / video
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        Some("avi") => "video/avi",
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wave",
        Some("ogg") => "application/ogg",

        // Documents and archives
        Some("pdf") => "application/pdf",
        Some("zip") => "application/zip",
        Some("gz" | "gzip") => "application/x-gzip",
        Some("tar") => "application/x-tar",
        Some("wasm") => "application/wasm",

        _ => "application/octet-stream",
    }
}
