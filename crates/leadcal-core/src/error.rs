//! Error types for Leadcal Core
//!
//! The aggregation core never fails on data. Errors come from three places
//! only:
//! - the data source, surfaced verbatim
//! - configuration loading
//! - decoding live feed frames

use leadcal_model::ModelError;
use std::path::PathBuf;
use std::sync::Arc;

/// Boxed upstream error
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Opaque failure reported by a [`ContactSource`](crate::source::ContactSource)
///
/// The message is shown to consumers as-is; the engine never retries.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct SourceError {
    message: String,
    #[source]
    source: Option<Arc<dyn std::error::Error + Send + Sync + 'static>>,
}

impl SourceError {
    /// Error with a message only
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Error wrapping an upstream cause
    #[must_use]
    pub fn with_source(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self {
            message: message.into(),
            source: Some(Arc::from(source.into())),
        }
    }

    /// Message as reported by the source
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.message
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid TOML or schema mismatch
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Value out of range
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}

/// Engine-level error
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Data source failed
    #[error("data source error: {0}")]
    Source(#[from] SourceError),

    /// Live frame could not be decoded
    #[error("live frame rejected: {0}")]
    Frame(#[from] ModelError),
}

impl EngineError {
    /// Check if the error came from the data source
    #[inline]
    #[must_use]
    pub fn is_source(&self) -> bool {
        matches!(self, Self::Source(_))
    }
}

/// Result alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
