//! Configuration module - environment variable parsing

use std::env;
use std::net::SocketAddr;

/// Hand tracker backend selection for the session service
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackerBackend {
    /// No CV model wired in; frames echo with no hand detected
    Off,
}

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Server binding address
    pub server_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Allowed client origin for CORS
    pub client_origin: String,
    /// Which hand tracker the session service runs
    pub hand_tracker: TrackerBackend,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Hosting platforms provide PORT, fall back to SERVER_ADDR or default
        let server_addr = if let Ok(port) = env::var("PORT") {
            format!("0.0.0.0:{}", port)
        } else {
            env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string())
        };

        let hand_tracker = match env::var("HAND_TRACKER") {
            Ok(value) if value == "off" => TrackerBackend::Off,
            Ok(value) => return Err(ConfigError::UnknownTracker(value)),
            Err(_) => TrackerBackend::Off,
        };

        Ok(Self {
            server_addr: server_addr
                .parse()
                .map_err(|_| ConfigError::InvalidAddress)?,

            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),

            client_origin: env::var("CLIENT_ORIGIN")
                .map_err(|_| ConfigError::Missing("CLIENT_ORIGIN"))?,

            hand_tracker,
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid server address format")]
    InvalidAddress,

    #[error("Unknown hand tracker backend: {0}")]
    UnknownTracker(String),
}
