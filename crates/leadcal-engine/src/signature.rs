//! Signature gate
//!
//! A [`Signature`] is a cheap fingerprint of every aggregation input. The
//! [`SignatureGate`] compares it with the last one it stored to decide
//! whether the current snapshot can be reused.

use leadcal_model::{ContactFilters, Period};
use std::fmt::{self, Display, Formatter};

/// Composite key of all aggregation inputs
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    pub period: Period,
    pub filters: ContactFilters,
    /// Roster entries under the active branch/state selection
    pub roster_len: usize,
    /// Raw events fetched for the period
    pub event_count: usize,
    /// Last live-feed update id, 0 when none arrived
    pub update_id: u64,
    /// Manual refresh token, bumped to force a recompute
    pub refresh_token: u64,
}

impl Display for Signature {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let opt = |v: &Option<String>| v.clone().unwrap_or_default();
        write!(
            f,
            "{}|{}|{}|{}|{}|{}|{}|{}|{}",
            self.period,
            opt(&self.filters.branch),
            opt(&self.filters.state),
            opt(&self.filters.status),
            opt(&self.filters.origin),
            self.roster_len,
            self.event_count,
            self.update_id,
            self.refresh_token,
        )
    }
}

/// Gate verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Inputs unchanged and a snapshot exists
    Reuse,
    /// Inputs changed, or nothing has been published yet
    Recompute,
}

/// Stores the last signature and decides reuse vs recompute
#[derive(Debug, Default)]
pub struct SignatureGate {
    last: Option<Signature>,
}

impl SignatureGate {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate `next` against the stored signature
    ///
    /// Without an existing snapshot the verdict is always
    /// [`GateDecision::Recompute`]. A recompute verdict stores `next`.
    pub fn evaluate(&mut self, next: Signature, has_snapshot: bool) -> GateDecision {
        if has_snapshot && self.last.as_ref() == Some(&next) {
            tracing::debug!(signature = %next, "signature unchanged, reusing snapshot");
            return GateDecision::Reuse;
        }
        tracing::debug!(signature = %next, "signature changed, recomputing");
        self.last = Some(next);
        GateDecision::Recompute
    }

    /// Last stored signature
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&Signature> {
        self.last.as_ref()
    }

    /// Forget the stored signature
    #[inline]
    pub fn reset(&mut self) {
        self.last = None;
    }
}
