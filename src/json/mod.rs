//! JSON codec module
//!
//! Strict request decoding and envelope-based response writing.

mod decode;
mod encode;

pub use decode::{decode_body, decode_request, decode_slice};
pub use encode::{error_json, write_json, JsonResponse};
