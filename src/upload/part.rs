// Multipart file part reader
// Wraps one multer field with a sniffable prefix and a byte limit

use crate::error::{Result, ToolkitError};
use crate::http::sniff::{detect_content_type, SNIFF_LEN};
use hyper::body::Bytes;
use multer::Field;

impl From<multer::Error> for ToolkitError {
    fn from(err: multer::Error) -> Self {
        match err {
            multer::Error::StreamReadFailed(source) => {
                Self::Io(std::io::Error::other(source))
            }
            other => Self::Multipart(other.to_string()),
        }
    }
}

/// One file part of a multipart body
///
/// Bytes buffered by `sniff` are replayed by `next_chunk`, so the part can be
/// classified first and still be copied from its first byte.
pub struct FilePart<'r> {
    field: Field<'r>,
    original_name: String,
    prefix: Option<Bytes>,
    limit: u64,
    read: u64,
}

impl<'r> FilePart<'r> {
    pub const fn new(field: Field<'r>, original_name: String, limit: u64) -> Self {
        Self {
            field,
            original_name,
            prefix: None,
            limit,
            read: 0,
        }
    }

    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    /// Classify the part by its first `SNIFF_LEN` bytes
    pub async fn sniff(&mut self) -> Result<&'static str> {
        let mut buf = match self.prefix.take() {
            Some(prefix) => prefix.to_vec(),
            None => Vec::with_capacity(SNIFF_LEN),
        };
        while buf.len() < SNIFF_LEN {
            match self.field.chunk().await? {
                Some(chunk) => buf.extend_from_slice(&chunk),
                None => break,
            }
        }
        let content_type = detect_content_type(&buf);
        self.prefix = Some(Bytes::from(buf));
        Ok(content_type)
    }

    /// Next chunk of the part, failing once more than `limit` bytes were read
    pub async fn next_chunk(&mut self) -> Result<Option<Bytes>> {
        let chunk = match self.prefix.take() {
            Some(prefix) if !prefix.is_empty() => Some(prefix),
            _ => self.field.chunk().await?,
        };

        if let Some(chunk) = &chunk {
            self.read += chunk.len() as u64;
            if self.read > self.limit {
                return Err(ToolkitError::FileTooLarge { limit: self.limit });
            }
        }
        Ok(chunk)
    }
}
