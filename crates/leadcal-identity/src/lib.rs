//! Leadcal Identity
//!
//! Resolves the free-text owner fields of contact events to canonical
//! seller names from the active roster.
//!
//! # Architecture
//!
//! ```text
//! roster → SellerIndex (strict + loose keys per name/e-mail) ─┐
//!            ↑ RosterIndexCache (moka, keyed by fingerprint)   │
//! event owner fields → SellerResolver (per-pass memo) ─────────┴→ canonical name | None
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use leadcal_identity::{SellerIndex, SellerResolver};
//!
//! let index = Arc::new(SellerIndex::build(&roster));
//! let mut resolver = SellerResolver::new(index);
//! let name = resolver.resolve(&event);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod cache;
pub mod index;
pub mod normalize;
pub mod resolver;

pub use cache::{IndexCacheStats, RosterFingerprint, RosterIndexCache};
pub use index::SellerIndex;
pub use normalize::{normalize_loose, normalize_name};
pub use resolver::{ResolverStats, SellerResolver};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
