//! Server and parser tunables.
//!
//! [`ServerConfig`] can be built in code with the `with_*` setters or loaded from
//! JSON; missing fields take their defaults. The setters do not validate;
//! [`ServerConfig::validate`] runs when the config is loaded from JSON or handed to
//! a server.
//!
//! ```
//! use wirehttp::config::ServerConfig;
//! use wirehttp::http::UnboundedBody;
//!
//! let config = ServerConfig::from_json_str(r#"{ "unbounded_body": "empty" }"#).unwrap();
//! assert_eq!(config.unbounded_body, UnboundedBody::Empty);
//! assert_eq!(config.read_buffer_size, 4096);
//! ```

use serde::Deserialize;
use thiserror::Error;

use crate::http::request::{DEFAULT_MAX_HEADER_BYTES, DEFAULT_MAX_LINE_LEN};
use crate::http::{RequestParser, UnboundedBody};

/// Default size of the per-connection read window.
pub const DEFAULT_READ_BUFFER_SIZE: usize = 4096;

/// Errors produced while loading a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Capacity of the read window each connection feeds to its parser.
    pub read_buffer_size: usize,
    /// Longest request line or header line accepted before `LineTooLong`.
    pub max_line_len: usize,
    /// Total size of header field lines accepted before `HeadersTooLarge`.
    pub max_header_bytes: usize,
    /// Body handling for requests without a usable `Content-Length`.
    pub unbounded_body: UnboundedBody,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            max_line_len: DEFAULT_MAX_LINE_LEN,
            max_header_bytes: DEFAULT_MAX_HEADER_BYTES,
            unbounded_body: UnboundedBody::default(),
        }
    }
}

impl ServerConfig {
    /// Parses and validates a JSON configuration document.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Json`] for malformed JSON or unknown fields, and
    /// [`ConfigError::Invalid`] if [`validate`](Self::validate) rejects the values.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every limit is usable.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] if a buffer size or length limit is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.read_buffer_size == 0 {
            return Err(ConfigError::Invalid("read_buffer_size must be positive"));
        }
        if self.max_line_len == 0 {
            return Err(ConfigError::Invalid("max_line_len must be positive"));
        }
        if self.max_header_bytes == 0 {
            return Err(ConfigError::Invalid("max_header_bytes must be positive"));
        }
        Ok(())
    }

    #[must_use]
    pub fn with_read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size;
        self
    }

    #[must_use]
    pub fn with_max_line_len(mut self, limit: usize) -> Self {
        self.max_line_len = limit;
        self
    }

    #[must_use]
    pub fn with_max_header_bytes(mut self, limit: usize) -> Self {
        self.max_header_bytes = limit;
        self
    }

    #[must_use]
    pub fn with_unbounded_body(mut self, policy: UnboundedBody) -> Self {
        self.unbounded_body = policy;
        self
    }

    /// Builds a request parser with this configuration's limits.
    pub fn parser(&self) -> RequestParser {
        RequestParser::new()
            .max_line_len(self.max_line_len)
            .max_header_bytes(self.max_header_bytes)
            .unbounded_body(self.unbounded_body)
    }
}
