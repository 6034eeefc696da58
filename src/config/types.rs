// Configuration types module
// Defines the per-call helper configs and the file-backed toolkit config

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default per-file upload limit: 1 GiB
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024 * 1024;

/// Default JSON body limit: 1 MiB
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct ToolkitConfig {
    pub server: ServerConfig,
    pub upload: UploadConfig,
    pub json: JsonDecodeConfig,
    pub logging: LoggingConfig,
}

/// Server configuration (demo binary only)
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Per-connection timeout in seconds
    pub read_timeout: u64,
    pub workers: Option<usize>,
}

/// Upload pipeline configuration, passed per invocation
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct UploadConfig {
    /// Destination directory, created on demand
    pub directory: PathBuf,
    /// Per-file limit in bytes; 0 means `DEFAULT_MAX_FILE_SIZE`
    #[serde(default)]
    pub max_file_size: u64,
    /// Exact sniffed MIME types accepted; empty accepts everything
    #[serde(default)]
    pub allowed_types: Vec<String>,
    /// Replace the stored base name with a random one
    #[serde(default = "default_rename")]
    pub rename: bool,
}

#[allow(clippy::missing_const_for_fn)]
fn default_rename() -> bool {
    true
}

impl UploadConfig {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            max_file_size: 0,
            allowed_types: Vec::new(),
            rename: default_rename(),
        }
    }

    #[must_use]
    pub fn with_allowed_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_types = types.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub const fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    #[must_use]
    pub const fn with_rename(mut self, rename: bool) -> Self {
        self.rename = rename;
        self
    }

    /// Effective per-file limit
    pub const fn file_size_limit(&self) -> u64 {
        if self.max_file_size == 0 {
            DEFAULT_MAX_FILE_SIZE
        } else {
            self.max_file_size
        }
    }
}

/// Strict JSON decoding configuration
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct JsonDecodeConfig {
    /// Body limit in bytes; 0 means `DEFAULT_MAX_BODY_SIZE`
    #[serde(default)]
    pub max_body_size: usize,
    #[serde(default)]
    pub allow_unknown_fields: bool,
}

impl Default for JsonDecodeConfig {
    fn default() -> Self {
        Self {
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            allow_unknown_fields: false,
        }
    }
}

impl JsonDecodeConfig {
    pub const fn body_limit(&self) -> usize {
        if self.max_body_size == 0 {
            DEFAULT_MAX_BODY_SIZE
        } else {
            self.max_body_size
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Minimum level written: error, warn, info or debug
    pub level: String,
    /// Log one line per handled request
    pub access_log: bool,
    /// Info log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}
