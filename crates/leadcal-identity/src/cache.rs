//! Roster index cache using moka
//!
//! Building a [`SellerIndex`] normalizes every roster name and e-mail. The
//! roster only changes when the branch/state selection changes, so indexes
//! are memoized across passes by a content fingerprint of the roster.

use crate::index::SellerIndex;
use leadcal_model::SellerRecord;
use moka::sync::Cache;
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

/// Blake3 fingerprint of the key-relevant roster content, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RosterFingerprint([u8; 32]);

impl RosterFingerprint {
    /// Fingerprint names and e-mails of `roster`
    ///
    /// Branch and state do not contribute resolution keys and are ignored.
    #[must_use]
    pub fn compute(roster: &[SellerRecord]) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&u64::try_from(roster.len()).unwrap_or(u64::MAX).to_le_bytes());
        for seller in roster {
            hasher.update(seller.name.as_bytes());
            hasher.update(&[0]);
            match seller.email.as_deref() {
                Some(email) => {
                    hasher.update(&[1]);
                    hasher.update(email.as_bytes());
                }
                None => {
                    hasher.update(&[2]);
                }
            }
            hasher.update(&[0]);
        }
        Self(*hasher.finalize().as_bytes())
    }

    /// Short representation (first 8 bytes, hex)
    #[must_use]
    pub fn short(&self) -> String {
        self.0[..8].iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl Display for RosterFingerprint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.short())
    }
}

/// Statistics for cache monitoring
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexCacheStats {
    /// Number of cached indexes
    pub entry_count: u64,
}

/// Bounded cache of seller indexes keyed by roster fingerprint
#[derive(Debug, Clone)]
pub struct RosterIndexCache {
    inner: Cache<RosterFingerprint, Arc<SellerIndex>>,
}

impl RosterIndexCache {
    /// Create cache holding at most `max_capacity` indexes
    #[inline]
    #[must_use]
    pub fn new(max_capacity: u64) -> Self {
        Self {
            inner: Cache::new(max_capacity),
        }
    }

    /// Index for `roster`, building and caching it on a miss
    #[must_use]
    pub fn get_or_build(&self, roster: &[SellerRecord]) -> Arc<SellerIndex> {
        let fingerprint = RosterFingerprint::compute(roster);
        self.inner.get_with(fingerprint, || {
            tracing::debug!(%fingerprint, sellers = roster.len(), "seller index cache miss");
            Arc::new(SellerIndex::build(roster))
        })
    }

    /// Cached index for `fingerprint`, if present
    #[inline]
    #[must_use]
    pub fn get(&self, fingerprint: &RosterFingerprint) -> Option<Arc<SellerIndex>> {
        self.inner.get(fingerprint)
    }

    /// Drop every cached index
    #[inline]
    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }

    /// Get cache statistics
    #[inline]
    #[must_use]
    pub fn stats(&self) -> IndexCacheStats {
        self.inner.run_pending_tasks();
        IndexCacheStats {
            entry_count: self.inner.entry_count(),
        }
    }
}

impl Default for RosterIndexCache {
    /// Create cache with default capacity (64 rosters)
    fn default() -> Self {
        Self::new(64)
    }
}
