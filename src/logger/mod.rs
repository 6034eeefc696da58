//! Logger module
//!
//! Provides logging utilities for the toolkit including:
//! - Upload accept/reject logging
//! - JSON decode rejections
//! - Download and remote push logging
//! - Request and server lifecycle logging for the demo server

pub mod writer;

pub use writer::Level;

use crate::config::LoggingConfig;
use crate::upload::UploadedFile;
use std::net::SocketAddr;
use std::time::Duration;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &LoggingConfig) -> std::io::Result<()> {
    writer::init(
        Level::parse(&config.level),
        config.access_log_file.as_deref(),
        config.error_log_file.as_deref(),
    )
}

fn write(level: Level, message: &str) {
    match writer::get() {
        Some(w) => w.write(level, message),
        None => match level {
            Level::Error | Level::Warn => eprintln!("{}", writer::format_line(level, message)),
            Level::Info => println!("{}", writer::format_line(level, message)),
            Level::Debug => {}
        },
    }
}

pub fn log_server_start(addr: &SocketAddr, upload_dir: &std::path::Path) {
    write(Level::Info, "======================================");
    write(Level::Info, &format!("Toolkit demo server listening on: http://{addr}"));
    write(Level::Info, &format!("Upload directory: {}", upload_dir.display()));
    write(Level::Info, "======================================");
}

pub fn log_shutdown() {
    write(Level::Info, "Shutdown signal received, no longer accepting connections");
}

pub fn log_info(message: &str) {
    write(Level::Info, message);
}

pub fn log_error(message: &str) {
    write(Level::Error, message);
}

pub fn log_warning(message: &str) {
    write(Level::Warn, message);
}

pub fn log_debug(message: &str) {
    write(Level::Debug, message);
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write(Level::Error, &format!("Failed to serve connection: {err:?}"));
}

pub fn log_upload_accepted(file: &UploadedFile, content_type: &str) {
    write(
        Level::Info,
        &format!(
            "[Upload] Stored '{}' as '{}' ({} bytes, {content_type})",
            file.original_name, file.new_name, file.size_bytes
        ),
    );
}

pub fn log_upload_rejected(original_name: &str, reason: &str) {
    write(
        Level::Warn,
        &format!("[Upload] Rejected '{original_name}': {reason}"),
    );
}

pub fn log_json_rejected(reason: &str) {
    write(Level::Debug, &format!("[JSON] Rejected body: {reason}"));
}

pub fn log_download(path: &std::path::Path, size: u64) {
    write(
        Level::Info,
        &format!("[Download] Sending {} ({size} bytes)", path.display()),
    );
}

pub fn log_remote_push(uri: &str, status: u16) {
    write(Level::Info, &format!("[Remote] POST {uri} - {status}"));
}

pub fn log_request(method: &str, path: &str, status: u16, elapsed: Duration) {
    write(
        Level::Info,
        &format!("{method} {path} - {status} ({}us)", elapsed.as_micros()),
    );
}
