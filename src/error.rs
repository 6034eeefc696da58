//! Error types module
//!
//! Every helper returns `ToolkitError`; callers translate it into a response,
//! usually through `json::error_json` with the status from `ErrKind::status`.

use hyper::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ToolkitError>;

/// Error raised by the upload, JSON, download, slug and remote helpers
#[derive(Debug, Error)]
pub enum ToolkitError {
    #[error("the uploaded file type is not permitted: {0}")]
    UnsupportedType(String),
    #[error("the uploaded file is too big (limit is {limit} bytes)")]
    FileTooLarge { limit: u64 },
    #[error("body must not be larger than {limit} bytes")]
    BodyTooLarge { limit: usize },
    #[error("body contains badly-formed JSON ({0})")]
    SyntaxError(String),
    #[error("body contains incorrect JSON type ({0})")]
    TypeMismatch(String),
    #[error("body must not be empty")]
    EmptyBody,
    #[error("body contains unknown key \"{0}\"")]
    UnknownField(String),
    #[error("body must only contain a single JSON value")]
    TrailingData,
    #[error("slug is empty after removing disallowed characters")]
    EmptyResult,
    #[error("request is not multipart/form-data or has no boundary")]
    MissingBoundary,
    #[error("malformed multipart body: {0}")]
    Multipart(String),
    #[error("no file was uploaded")]
    NoFile,
    #[error("expected exactly one file, received {0}")]
    TooManyFiles(usize),
    #[error("failed to serialize JSON: {0}")]
    Serialize(String),
    #[error("remote request failed: {0}")]
    Transport(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Discriminant of `ToolkitError`, convenient for matching and status mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrKind {
    UnsupportedType,
    FileTooLarge,
    BodyTooLarge,
    SyntaxError,
    TypeMismatch,
    EmptyBody,
    UnknownField,
    TrailingData,
    EmptyResult,
    MissingBoundary,
    Multipart,
    NoFile,
    TooManyFiles,
    Serialize,
    Transport,
    Io,
}

impl ToolkitError {
    pub const fn kind(&self) -> ErrKind {
        match self {
            Self::UnsupportedType(_) => ErrKind::UnsupportedType,
            Self::FileTooLarge { .. } => ErrKind::FileTooLarge,
            Self::BodyTooLarge { .. } => ErrKind::BodyTooLarge,
            Self::SyntaxError(_) => ErrKind::SyntaxError,
            Self::TypeMismatch(_) => ErrKind::TypeMismatch,
            Self::EmptyBody => ErrKind::EmptyBody,
            Self::UnknownField(_) => ErrKind::UnknownField,
            Self::TrailingData => ErrKind::TrailingData,
            Self::EmptyResult => ErrKind::EmptyResult,
            Self::MissingBoundary => ErrKind::MissingBoundary,
            Self::Multipart(_) => ErrKind::Multipart,
            Self::NoFile => ErrKind::NoFile,
            Self::TooManyFiles(_) => ErrKind::TooManyFiles,
            Self::Serialize(_) => ErrKind::Serialize,
            Self::Transport(_) => ErrKind::Transport,
            Self::Io(_) => ErrKind::Io,
        }
    }
}

impl ErrKind {
    /// Suggested response status for this kind of failure
    pub const fn status(self) -> StatusCode {
        match self {
            Self::FileTooLarge | Self::BodyTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::UnsupportedType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::SyntaxError
            | Self::TypeMismatch
            | Self::EmptyBody
            | Self::UnknownField
            | Self::TrailingData
            | Self::EmptyResult
            | Self::MissingBoundary
            | Self::Multipart
            | Self::NoFile
            | Self::TooManyFiles => StatusCode::BAD_REQUEST,
            Self::Transport => StatusCode::BAD_GATEWAY,
            Self::Serialize | Self::Io => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
