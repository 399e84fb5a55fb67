//! Slice scheduling for the chunked aggregator

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default events per slice
pub const DEFAULT_SLICE_SIZE: usize = 6000;

/// How a pass hands control back to the host between slices
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum YieldStrategy {
    /// Re-queue behind every other ready task
    #[default]
    Immediate,
    /// Sleep between slices, leaving the host idle time
    Paced { pace_ms: u64 },
}

impl YieldStrategy {
    /// Suspend for one scheduling turn
    pub async fn yield_turn(self) {
        match self {
            Self::Immediate => tokio::task::yield_now().await,
            Self::Paced { pace_ms } => tokio::time::sleep(Duration::from_millis(pace_ms)).await,
        }
    }
}

/// Chunked aggregation tuning
///
/// Larger slices raise total throughput; smaller slices keep the host
/// responsive during large scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationTuning {
    /// Events processed per scheduling turn
    pub slice_size: usize,
    /// Yield primitive used between slices
    pub yield_strategy: YieldStrategy,
}

impl AggregationTuning {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With slice size (at least 1)
    #[inline]
    #[must_use]
    pub fn with_slice_size(mut self, slice_size: usize) -> Self {
        self.slice_size = slice_size.max(1);
        self
    }

    /// With yield strategy
    #[inline]
    #[must_use]
    pub fn with_yield_strategy(mut self, yield_strategy: YieldStrategy) -> Self {
        self.yield_strategy = yield_strategy;
        self
    }

    /// Slice size clamped to at least 1
    #[inline]
    #[must_use]
    pub fn effective_slice_size(&self) -> usize {
        self.slice_size.max(1)
    }
}

impl Default for AggregationTuning {
    fn default() -> Self {
        Self {
            slice_size: DEFAULT_SLICE_SIZE,
            yield_strategy: YieldStrategy::Immediate,
        }
    }
}
