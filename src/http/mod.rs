//! HTTP layer module
//!
//! Content sniffing, download MIME lookup, attachment downloads and the
//! shared response body type.

pub mod download;
pub mod mime;
pub mod response;
pub mod sniff;

// Re-export commonly used items
pub use download::download_static_file;
pub use response::{full_body, into_boxed_response, BoxedBody};
pub use sniff::{detect_content_type, SNIFF_LEN};
