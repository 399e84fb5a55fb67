//! Roster resolution index
//!
//! Provides [`SellerIndex`], the key map from normalized identifiers to
//! canonical seller names, plus the row position of every canonical name.

use crate::normalize::{normalize_loose, normalize_name};
use leadcal_model::{ContactEvent, SellerRecord};
use std::collections::HashMap;
use std::sync::Arc;

/// Normalized-key → canonical-name map built from one roster
///
/// Every roster entry registers up to four keys: strict and loose forms of
/// its name, and of its e-mail when present. A later entry registering the
/// same key overwrites an earlier one, so resolution is deterministic for a
/// fixed roster order. Empty keys are never registered.
#[derive(Debug, Clone, Default)]
pub struct SellerIndex {
    /// Normalized key → canonical name
    keys: HashMap<String, Arc<str>>,
    /// Canonical names in roster order
    names: Vec<Arc<str>>,
    /// Canonical name → row position (last duplicate wins)
    rows: HashMap<Arc<str>, usize>,
}

impl SellerIndex {
    /// Build index for `roster`
    #[must_use]
    pub fn build(roster: &[SellerRecord]) -> Self {
        let mut keys = HashMap::with_capacity(roster.len() * 4);
        let mut names = Vec::with_capacity(roster.len());
        let mut rows = HashMap::with_capacity(roster.len());

        for (position, seller) in roster.iter().enumerate() {
            let name: Arc<str> = Arc::from(seller.name.as_str());

            let mut register = |raw: &str| {
                for key in [normalize_name(raw), normalize_loose(raw)] {
                    if !key.is_empty() {
                        keys.insert(key, Arc::clone(&name));
                    }
                }
            };
            register(&seller.name);
            if let Some(email) = seller.email.as_deref().filter(|e| !e.is_empty()) {
                register(email);
            }

            rows.insert(Arc::clone(&name), position);
            names.push(name);
        }

        tracing::debug!(sellers = names.len(), keys = keys.len(), "built seller index");

        Self { keys, names, rows }
    }

    /// Resolve `event` without memoization
    ///
    /// Candidates are tried primary field first, strict key before loose key.
    #[must_use]
    pub fn resolve(&self, event: &ContactEvent) -> Option<Arc<str>> {
        event
            .owner_candidates()
            .into_iter()
            .find_map(|raw| self.resolve_raw(raw))
    }

    /// Resolve one raw identifier, strict key before loose key
    #[must_use]
    pub fn resolve_raw(&self, raw: &str) -> Option<Arc<str>> {
        self.keys
            .get(&normalize_name(raw))
            .or_else(|| self.keys.get(&normalize_loose(raw)))
            .cloned()
    }

    /// Row position of canonical `name`
    #[inline]
    #[must_use]
    pub fn row_of(&self, name: &str) -> Option<usize> {
        self.rows.get(name).copied()
    }

    /// Canonical names in roster order
    #[inline]
    #[must_use]
    pub fn names(&self) -> &[Arc<str>] {
        &self.names
    }

    /// Number of roster entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the roster was empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Number of registered keys
    #[inline]
    #[must_use]
    pub fn key_count(&self) -> usize {
        self.keys.len()
    }
}
