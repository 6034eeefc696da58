// Configuration module entry point
// Loads the toolkit configuration from file and environment

mod types;

use std::net::SocketAddr;

// Re-export public types
pub use types::{
    JsonDecodeConfig, LoggingConfig, ServerConfig, ToolkitConfig, UploadConfig,
    DEFAULT_MAX_BODY_SIZE, DEFAULT_MAX_FILE_SIZE,
};

impl ToolkitConfig {
    /// Load configuration from `config.toml` in the working directory
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from specified file path (without extension)
    /// The file is optional; `WEBTOOLS_*` environment variables override it
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("WEBTOOLS")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("upload.allowed_types")
                    .try_parsing(true),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.read_timeout", 30)?
            .set_default("upload.directory", "uploads")?
            .set_default("upload.max_file_size", types::DEFAULT_MAX_FILE_SIZE)?
            .set_default("upload.allowed_types", Vec::<String>::new())?
            .set_default("upload.rename", true)?
            .set_default("json.max_body_size", 1_048_576)? // 1MB
            .set_default("json.allow_unknown_fields", false)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}
