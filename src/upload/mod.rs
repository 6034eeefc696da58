//! File upload module
//!
//! Multipart ingestion with content sniffing, allow-list validation,
//! optional random renaming and streaming writes.

pub mod namer;
mod part;
mod pipeline;
pub mod validator;

use serde::{Deserialize, Serialize};

pub use namer::FileNamer;
pub use part::FilePart;
pub use pipeline::{boundary_from_headers, create_dir_if_not_exist, UploadPipeline};

/// A file stored by the upload pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    /// File name sent by the client, reduced to its final path component
    pub original_name: String,
    /// Name of the file inside the upload directory
    ///
    /// Without renaming this is the client's name, so two parts with the same
    /// name share it and the later part's content is what remains on disk.
    pub new_name: String,
    /// Bytes written to disk
    pub size_bytes: u64,
}
