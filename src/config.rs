//! Configuration management with environment variable support
//!
//! The whole server is driven by one immutable [`Config`] built at startup
//! and handed to the backend client and the transport listeners.

pub mod errors;

pub use errors::{ConfigError, Result};

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default port of the `/zoekt/sse` listener
pub const DEFAULT_SSE_PORT: u16 = 8000;
/// Default port of the `/zoekt/mcp` listener
pub const DEFAULT_STREAMABLE_HTTP_PORT: u16 = 8080;
/// Default backend request timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Default cap on a rendered search response
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 100_000;
/// Default cap on a rendered file
pub const DEFAULT_MAX_FILE_BYTES: usize = 100_000;

/// How the MCP service is exposed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportMode {
    /// Streamable HTTP on both listen ports
    Http,
    /// A single session over stdin/stdout
    Stdio,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Zoekt web server base URL
    pub zoekt_api_url: String,
    pub transport: TransportMode,
    /// Host the HTTP listeners bind to
    pub bind_host: String,
    pub sse_port: u16,
    pub streamable_http_port: u16,
    /// Bound on every backend request
    pub request_timeout: Duration,
    /// Maximum size of a rendered search response
    pub max_response_bytes: usize,
    /// Maximum size of a rendered file
    pub max_file_bytes: usize,
    /// Optional organization-specific text prepended to every query guide
    pub org_guide_path: Option<PathBuf>,
}

impl Config {
    /// Create a configuration with defaults for everything but the backend URL
    pub fn new(zoekt_api_url: impl Into<String>) -> Self {
        Self {
            zoekt_api_url: zoekt_api_url.into(),
            transport: TransportMode::Http,
            bind_host: "0.0.0.0".to_string(),
            sse_port: DEFAULT_SSE_PORT,
            streamable_http_port: DEFAULT_STREAMABLE_HTTP_PORT,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            org_guide_path: None,
        }
    }

    /// Load configuration from environment variables
    ///
    /// Supported environment variables:
    /// - ZOEKT_API_URL: Zoekt web server URL (required)
    /// - MCP_TRANSPORT: `http` or `stdio` (default: http)
    /// - MCP_BIND_HOST: listen host for HTTP mode (default: 0.0.0.0)
    /// - MCP_SSE_PORT: port serving `/zoekt/sse` (default: 8000)
    /// - MCP_STREAMABLE_HTTP_PORT: port serving `/zoekt/mcp` (default: 8080)
    /// - ZOEKT_TIMEOUT_SECS: backend request timeout (default: 30)
    /// - ZOEKT_MAX_RESPONSE_BYTES: search response cap (default: 100000)
    /// - ZOEKT_MAX_FILE_BYTES: fetched file cap (default: 100000)
    /// - ZOEKT_ORG_GUIDE_PATH: file prepended to query guides (default: none)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup("ZOEKT_API_URL")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingVar("ZOEKT_API_URL"))?;

        // `zoekt:6070` parses with `zoekt` as its scheme, so check the scheme too
        let reason = match reqwest::Url::parse(&url) {
            Err(e) => Some(e.to_string()),
            Ok(parsed) if !matches!(parsed.scheme(), "http" | "https") => Some(format!(
                "scheme must be http or https, got '{}'",
                parsed.scheme()
            )),
            Ok(_) => None,
        };
        if let Some(reason) = reason {
            return Err(ConfigError::InvalidUrl {
                var: "ZOEKT_API_URL",
                value: url,
                reason,
            });
        }

        let mut config = Self::new(url);

        if let Some(mode) = lookup("MCP_TRANSPORT") {
            match mode.trim().to_ascii_lowercase().as_str() {
                "http" | "streamable-http" | "sse" => config.transport = TransportMode::Http,
                "stdio" => config.transport = TransportMode::Stdio,
                other => tracing::warn!("Ignoring unknown MCP_TRANSPORT '{}'", other),
            }
        }

        if let Some(host) = lookup("MCP_BIND_HOST").filter(|h| !h.trim().is_empty()) {
            config.bind_host = host.trim().to_string();
        }

        if let Some(port) = parse_var(&lookup, "MCP_SSE_PORT") {
            config.sse_port = port;
        }

        if let Some(port) = parse_var(&lookup, "MCP_STREAMABLE_HTTP_PORT") {
            config.streamable_http_port = port;
        }

        if let Some(secs) = parse_var::<u64, _>(&lookup, "ZOEKT_TIMEOUT_SECS") {
            if secs > 0 {
                config.request_timeout = Duration::from_secs(secs);
            }
        }

        if let Some(bytes) = parse_var::<usize, _>(&lookup, "ZOEKT_MAX_RESPONSE_BYTES") {
            if bytes > 0 {
                config.max_response_bytes = bytes;
            }
        }

        if let Some(bytes) = parse_var::<usize, _>(&lookup, "ZOEKT_MAX_FILE_BYTES") {
            if bytes > 0 {
                config.max_file_bytes = bytes;
            }
        }

        if let Some(path) = lookup("ZOEKT_ORG_GUIDE_PATH").filter(|p| !p.trim().is_empty()) {
            config.org_guide_path = Some(PathBuf::from(path.trim()));
        }

        Ok(config)
    }

    /// Read the organization guide, if one is configured
    pub fn load_org_guide(&self) -> Result<Option<String>> {
        let Some(path) = &self.org_guide_path else {
            return Ok(None);
        };

        std::fs::read_to_string(path)
            .map(Some)
            .map_err(|source| ConfigError::OrgGuide {
                path: path.clone(),
                source,
            })
    }

    /// Log a configuration summary
    pub fn log_summary(&self) {
        tracing::info!("Zoekt API URL:        {}", self.zoekt_api_url);
        tracing::info!("Transport:            {:?}", self.transport);
        if self.transport == TransportMode::Http {
            tracing::info!("SSE port:             {}", self.sse_port);
            tracing::info!("Streamable HTTP port: {}", self.streamable_http_port);
        }
        tracing::info!("Request timeout:      {}s", self.request_timeout.as_secs());
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring unparsable {}='{}'", key, raw);
            None
        }
    }
}
