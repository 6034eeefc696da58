//! Helpers for hyper request handlers
//!
//! - `upload`: multipart file uploads with content sniffing and allow-lists
//! - `json`: strict JSON request decoding and envelope responses
//! - `http`: attachment downloads and response body plumbing
//! - `slug`: URL slugs from free text
//! - `remote`: JSON POSTs to other services

pub mod config;
pub mod error;
pub mod http;
pub mod json;
pub mod logger;
pub mod remote;
pub mod slug;
pub mod upload;

pub use config::{JsonDecodeConfig, ToolkitConfig, UploadConfig};
pub use error::{ErrKind, Result, ToolkitError};
pub use http::download_static_file;
pub use json::{decode_request, error_json, write_json, JsonResponse};
pub use remote::{push_json_to_remote, RemoteClient};
pub use slug::slugify;
pub use upload::{create_dir_if_not_exist, UploadPipeline, UploadedFile};
