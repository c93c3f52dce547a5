//! Configuration error types
//!
//! Raised once at startup; the server refuses to start on any of them.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while building the server configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required environment variable is unset or empty
    #[error("Required environment variable {0} is not set")]
    MissingVar(&'static str),

    /// The backend base URL could not be parsed
    #[error("Invalid URL in {var}: '{value}' ({reason})")]
    InvalidUrl {
        var: &'static str,
        value: String,
        reason: String,
    },

    /// The organization guide file could not be read
    #[error("Failed to read organization guide {}: {source}", .path.display())]
    OrgGuide {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;
