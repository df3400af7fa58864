// Configuration module entry point
// Manages application configuration and shared runtime state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{
    Config, DatasetConfig, HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig,
};

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Default config file is "config.toml" when no path specified
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("CAFE").separator("__"))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "common")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("performance.backlog", 128)?
            .set_default("http.enable_cors", false)?
            .set_default("http.max_body_size", 10_485_760)? // 10MB
            .build()?;

        settings.try_deserialize()
    }

    /// Load configuration from the default "config" file
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("config")
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}
