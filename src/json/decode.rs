//! Strict JSON request decoding
//!
//! A body is accepted only if it fits the size limit, holds exactly one JSON
//! document, matches the target type, and (unless allowed) carries no keys
//! the target does not declare.

use crate::config::JsonDecodeConfig;
use crate::error::{Result, ToolkitError};
use crate::logger;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::Body;
use hyper::Request;
use serde::de::DeserializeOwned;
use serde_json::error::Category;

/// Decode the body of `req` into `T`
pub async fn decode_request<B, T>(req: Request<B>, config: &JsonDecodeConfig) -> Result<T>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    T: DeserializeOwned,
{
    decode_body(req.into_body(), config).await
}

/// Read at most `config.body_limit()` bytes from `body` and decode them into `T`
///
/// The limit is enforced frame by frame, so an oversized body is abandoned as
/// soon as it crosses the limit.
pub async fn decode_body<B, T>(body: B, config: &JsonDecodeConfig) -> Result<T>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    T: DeserializeOwned,
{
    let limit = config.body_limit();
    let bytes = match Limited::new(body, limit).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.is::<LengthLimitError>() => {
            logger::log_json_rejected(&format!("body exceeds {limit} bytes"));
            return Err(ToolkitError::BodyTooLarge { limit });
        }
        Err(e) => return Err(ToolkitError::Io(std::io::Error::other(e))),
    };

    decode_slice(&bytes, config.allow_unknown_fields).inspect_err(|e| {
        logger::log_json_rejected(&e.to_string());
    })
}

/// Decode exactly one JSON document from `data` into `T`
pub fn decode_slice<T: DeserializeOwned>(data: &[u8], allow_unknown_fields: bool) -> Result<T> {
    if data.iter().all(u8::is_ascii_whitespace) {
        return Err(ToolkitError::EmptyBody);
    }

    let mut de = serde_json::Deserializer::from_slice(data);
    let mut unknown = None;
    let mut track = |path: serde_ignored::Path<'_>| {
        if unknown.is_none() {
            unknown = Some(key_path(&path));
        }
    };
    let tracked = serde_ignored::Deserializer::new(&mut de, &mut track);
    let value: T = serde_path_to_error::deserialize(tracked).map_err(classify)?;

    if let (false, Some(key)) = (allow_unknown_fields, unknown) {
        return Err(ToolkitError::UnknownField(key));
    }

    // A second document (or any other trailing token) is not allowed
    de.end().map_err(|_| ToolkitError::TrailingData)?;

    Ok(value)
}

/// Dotted location of an ignored key, e.g. `items.0.name`
fn key_path(path: &serde_ignored::Path<'_>) -> String {
    use serde_ignored::Path;

    match path {
        Path::Root => String::new(),
        Path::Seq { parent, index } => join_path(key_path(parent), &index.to_string()),
        Path::Map { parent, key } => join_path(key_path(parent), key),
        Path::Some { parent } | Path::NewtypeStruct { parent } | Path::NewtypeVariant { parent } => {
            key_path(parent)
        }
    }
}

fn join_path(parent: String, segment: &str) -> String {
    if parent.is_empty() {
        segment.to_string()
    } else {
        format!("{parent}.{segment}")
    }
}

/// Map a serde_json failure onto the decode error kinds
fn classify(err: serde_path_to_error::Error<serde_json::Error>) -> ToolkitError {
    let field = err.path().iter().next().is_some().then(|| err.path().to_string());
    let err = err.into_inner();
    match err.classify() {
        Category::Eof => ToolkitError::SyntaxError(format!(
            "unexpected end of input at line {} column {}",
            err.line(),
            err.column()
        )),
        Category::Syntax => ToolkitError::SyntaxError(err.to_string()),
        Category::Data => {
            let message = err.to_string();
            match (unknown_field_name(&message), field) {
                (Some(name), _) => ToolkitError::UnknownField(name),
                (None, Some(field)) => {
                    ToolkitError::TypeMismatch(format!("field \"{field}\": {message}"))
                }
                (None, None) => ToolkitError::TypeMismatch(message),
            }
        }
        Category::Io => ToolkitError::Io(err.into()),
    }
}

/// Targets with `#[serde(deny_unknown_fields)]` fail inside serde itself
fn unknown_field_name(message: &str) -> Option<String> {
    let rest = message.strip_prefix("unknown field `")?;
    rest.split('`').next().map(ToString::to_string)
}
