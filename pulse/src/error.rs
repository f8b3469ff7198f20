//! describe errors in Pulse

use std::path::PathBuf;

use thiserror::Error;

/// Error type for configuration resolution and probe construction
///
/// Network outcomes (refused, timed out, unresolvable) are never reported through this type,
/// they fold into an unhealthy result instead.
#[derive(Error, Debug)]
pub enum PulseError {
    /// Mode is not one of tcp, udp or http
    #[error("Invalid mode: {0}. Use 'tcp', 'udp', or 'http'")]
    InvalidMode(String),
    /// Port outside 1..=65535
    #[error("Invalid port: {0}. Must be between 1 and 65535")]
    InvalidPort(i64),
    /// HTTP method outside the allowed set
    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),
    /// Timeout could not be parsed or is zero
    #[error("Invalid timeout: {0}")]
    InvalidTimeout(String),
    /// A config file was given but does not exist
    #[error("Config file not found: {}", .0.display())]
    ConfigFileNotFound(PathBuf),
    /// Layered configuration could not be extracted
    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),
    /// Error when starting the runtime
    #[error("io::Error eg from tokio start: {0}")]
    IoError(#[from] std::io::Error),
    /// Target could not be turned into a URL
    #[error("Invalid URL `{url}`: {source}")]
    UrlError {
        url: String,
        source: url::ParseError,
    },
    /// Reqwest client or request could not be built
    #[error("Reqwest error: {0}")]
    RequestError(#[from] reqwest::Error),
}

impl From<figment::Error> for PulseError {
    fn from(err: figment::Error) -> PulseError {
        PulseError::Config(Box::new(err))
    }
}

impl PulseError {
    /// True for errors detected while resolving configuration, before any probe runs
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            PulseError::InvalidMode(_)
                | PulseError::InvalidPort(_)
                | PulseError::InvalidMethod(_)
                | PulseError::InvalidTimeout(_)
                | PulseError::ConfigFileNotFound(_)
                | PulseError::Config(_)
        )
    }
}
