//! Per-pass memoized seller resolution

use crate::index::SellerIndex;
use leadcal_model::ContactEvent;
use std::collections::HashMap;
use std::sync::Arc;

/// Resolution counters for one pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolverStats {
    /// Lookups answered from the memo
    pub memo_hits: u64,
    /// Lookups that went to the index
    pub index_lookups: u64,
    /// Distinct raw identifiers memoized
    pub memo_entries: usize,
}

/// Seller resolver scoped to one aggregation pass
///
/// The first resolution of a raw owner identifier is memoized and reused for
/// every later event carrying the identical raw string. Resolution is a pure
/// function of that string for a fixed roster, so the memo must never
/// outlive the pass (or the roster) it was created for.
#[derive(Debug)]
pub struct SellerResolver {
    index: Arc<SellerIndex>,
    memo: HashMap<String, Option<Arc<str>>>,
    stats: ResolverStats,
}

impl SellerResolver {
    /// Create resolver over `index` with an empty memo
    #[inline]
    #[must_use]
    pub fn new(index: Arc<SellerIndex>) -> Self {
        Self {
            index,
            memo: HashMap::new(),
            stats: ResolverStats::default(),
        }
    }

    /// Resolve `event` to a canonical seller name
    ///
    /// Events without any owner identifier are resolved uncached.
    pub fn resolve(&mut self, event: &ContactEvent) -> Option<Arc<str>> {
        let Some(key) = event.owner_key() else {
            self.stats.index_lookups += 1;
            return self.index.resolve(event);
        };

        if let Some(hit) = self.memo.get(key) {
            self.stats.memo_hits += 1;
            return hit.clone();
        }

        self.stats.index_lookups += 1;
        let resolved = self.index.resolve(event);
        self.memo.insert(key.to_owned(), resolved.clone());
        resolved
    }

    /// Underlying index
    #[inline]
    #[must_use]
    pub fn index(&self) -> &Arc<SellerIndex> {
        &self.index
    }

    /// Counters accumulated so far
    #[inline]
    #[must_use]
    pub fn stats(&self) -> ResolverStats {
        ResolverStats {
            memo_entries: self.memo.len(),
            ..self.stats
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadcal_model::SellerRecord;

    fn resolver() -> SellerResolver {
        let roster = vec![
            SellerRecord::new("Maria Dos Santos").with_email("maria.santos@x.com"),
            SellerRecord::new("Carlos Souza"),
        ];
        SellerResolver::new(Arc::new(SellerIndex::build(&roster)))
    }

    #[test]
    fn memoizes_by_raw_owner_string() {
        let mut resolver = resolver();
        let event = ContactEvent::new("2026-10-01").with_user("maria.santos");

        for _ in 0..5 {
            assert_eq!(resolver.resolve(&event).as_deref(), Some("Maria Dos Santos"));
        }

        let stats = resolver.stats();
        assert_eq!(stats.index_lookups, 1);
        assert_eq!(stats.memo_hits, 4);
        assert_eq!(stats.memo_entries, 1);
    }

    #[test]
    fn memoizes_misses_too() {
        let mut resolver = resolver();
        let event = ContactEvent::new("2026-10-01").with_user("ghost");

        assert!(resolver.resolve(&event).is_none());
        assert!(resolver.resolve(&event).is_none());
        assert_eq!(resolver.stats().memo_hits, 1);
    }

    #[test]
    fn first_resolution_is_reused_for_same_primary_key() {
        let mut resolver = resolver();
        let first = ContactEvent::new("2026-10-01")
            .with_user("shared")
            .with_seller("Carlos Souza");
        let second = ContactEvent::new("2026-10-02")
            .with_user("shared")
            .with_seller("Maria Dos Santos");

        assert_eq!(resolver.resolve(&first).as_deref(), Some("Carlos Souza"));
        assert_eq!(resolver.resolve(&second).as_deref(), Some("Carlos Souza"));
    }

    #[test]
    fn ownerless_events_bypass_memo() {
        let mut resolver = resolver();
        let event = ContactEvent::new("2026-10-01");
        assert!(resolver.resolve(&event).is_none());
        assert_eq!(resolver.stats().memo_entries, 0);
    }
}
