//! Engine configuration
//!
//! Loaded from TOML. Every section and field is optional:
//!
//! ```toml
//! [aggregation]
//! slice_size = 6000
//! yield_strategy = { mode = "paced", pace_ms = 4 }
//!
//! [identity]
//! index_cache_capacity = 64
//!
//! [live]
//! resync_on_update = true
//! recent_window_secs = 30
//! channel_capacity = 256
//! ```

use crate::error::ConfigError;
use leadcal_engine::{AggregationTuning, YieldStrategy};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Identity resolution settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Rosters whose resolution index is kept across passes
    pub index_cache_capacity: u64,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            index_cache_capacity: 64,
        }
    }
}

/// Live feed settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveConfig {
    /// Run a full sync after each accepted contacts update
    pub resync_on_update: bool,
    /// Window for [`FeedStatus::has_recent_updates`](crate::feed::FeedStatus::has_recent_updates)
    pub recent_window_secs: u64,
    /// Buffered frames between the transport and the engine
    pub channel_capacity: usize,
}

impl LiveConfig {
    #[inline]
    #[must_use]
    pub fn recent_window(&self) -> Duration {
        Duration::from_secs(self.recent_window_secs)
    }
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            resync_on_update: true,
            recent_window_secs: 30,
            channel_capacity: 256,
        }
    }
}

/// Top-level engine configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub aggregation: AggregationTuning,
    pub identity: IdentityConfig,
    pub live: LiveConfig,
}

impl EngineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate TOML text
    ///
    /// # Errors
    /// Returns [`ConfigError`] on malformed TOML or out-of-range values
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    ///
    /// # Errors
    /// Returns [`ConfigError`] when the file cannot be read or is invalid
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), ?config, "configuration loaded");
        Ok(config)
    }

    /// Check value ranges
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] naming the first bad field
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.aggregation.slice_size == 0 {
            return Err(ConfigError::Invalid {
                field: "aggregation.slice_size",
                reason: "must be at least 1".into(),
            });
        }
        if self.identity.index_cache_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "identity.index_cache_capacity",
                reason: "must be at least 1".into(),
            });
        }
        if self.live.channel_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "live.channel_capacity",
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }

    /// With slice size
    #[inline]
    #[must_use]
    pub fn with_slice_size(mut self, slice_size: usize) -> Self {
        self.aggregation = self.aggregation.with_slice_size(slice_size);
        self
    }

    /// With yield strategy
    #[inline]
    #[must_use]
    pub fn with_yield_strategy(mut self, strategy: YieldStrategy) -> Self {
        self.aggregation = self.aggregation.with_yield_strategy(strategy);
        self
    }

    /// With roster index cache capacity
    #[inline]
    #[must_use]
    pub fn with_index_cache_capacity(mut self, capacity: u64) -> Self {
        self.identity.index_cache_capacity = capacity;
        self
    }

    /// With resync after live updates
    #[inline]
    #[must_use]
    pub fn with_resync_on_update(mut self, resync: bool) -> Self {
        self.live.resync_on_update = resync;
        self
    }

    /// With recent-update window
    #[inline]
    #[must_use]
    pub fn with_recent_window_secs(mut self, secs: u64) -> Self {
        self.live.recent_window_secs = secs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_text_gives_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.aggregation.slice_size, 6000);
        assert_eq!(config.identity.index_cache_capacity, 64);
        assert!(config.live.resync_on_update);
        assert_eq!(config.live.recent_window(), Duration::from_secs(30));
    }

    #[test]
    fn partial_sections_merge_with_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            [aggregation]
            slice_size = 500
            yield_strategy = { mode = "paced", pace_ms = 4 }

            [live]
            resync_on_update = false
            "#,
        )
        .unwrap();
        assert_eq!(config.aggregation.slice_size, 500);
        assert_eq!(
            config.aggregation.yield_strategy,
            YieldStrategy::Paced { pace_ms: 4 }
        );
        assert!(!config.live.resync_on_update);
        assert_eq!(config.live.channel_capacity, 256);
    }

    #[test]
    fn zero_slice_size_is_rejected() {
        let err = EngineConfig::from_toml_str("[aggregation]\nslice_size = 0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "aggregation.slice_size",
                ..
            }
        ));
    }

    #[test]
    fn unknown_mode_is_a_parse_error() {
        let err = EngineConfig::from_toml_str(
            "[aggregation]\nyield_strategy = { mode = \"idle\" }\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leadcal.toml");
        std::fs::write(&path, "[identity]\nindex_cache_capacity = 8\n").unwrap();
        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.identity.index_cache_capacity, 8);
    }

    #[test]
    fn load_reports_missing_file() {
        let err = EngineConfig::load("/nonexistent/leadcal.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
