//! Error types for the model crate

/// Errors raised while constructing or decoding model values
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Month outside 1..=12 or a year chrono cannot represent
    #[error("invalid period: {year}-{month:02}")]
    InvalidPeriod { year: i32, month: u32 },

    /// Live feed message could not be decoded
    #[error("undecodable live message: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ModelError {
    /// Create invalid period error
    #[inline]
    pub fn invalid_period(year: i32, month: u32) -> Self {
        Self::InvalidPeriod { year, month }
    }
}

/// Result type alias for model operations
pub type ModelResult<T> = Result<T, ModelError>;
