//! Leadcal Engine
//!
//! Incremental seller-by-day lead aggregation.
//!
//! # Architecture
//!
//! ```text
//! inputs → Signature → SignatureGate ─ reuse ───────────────────────┐
//!                            └ recompute → ChunkedAggregator ─ publish ─┤
//!                                            (slices + yield)           ↓
//! live update → IncrementalPatcher ─ replace ───────────────→ SnapshotHolder → consumers
//! ```
//!
//! Every full pass holds a [`PassTicket`]. Starting a new pass supersedes all
//! older ones; a superseded pass stops at its next slice boundary and never
//! publishes.
//!
//! # Example
//!
//! ```rust,ignore
//! use leadcal_engine::{AggregationInput, AggregationTuning, ChunkedAggregator, SnapshotHolder};
//!
//! let holder = Arc::new(SnapshotHolder::new());
//! let aggregator = ChunkedAggregator::new(AggregationTuning::new(), Arc::clone(&holder));
//! let ticket = aggregator.begin();
//! let outcome = aggregator.run(input, ticket).await;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod aggregator;
pub mod calendar;
pub mod patch;
pub mod schedule;
pub mod signature;
pub mod snapshot;

pub use aggregator::{AggregationInput, ChunkedAggregator, PassOutcome, PassStats};
pub use calendar::{CalendarComputed, ContactTypeStats, SellerRow};
pub use patch::{patch_snapshot, IncrementalPatcher, PatchContext, PatchOutcome, SkipReason};
pub use schedule::{AggregationTuning, YieldStrategy, DEFAULT_SLICE_SIZE};
pub use signature::{GateDecision, Signature, SignatureGate};
pub use snapshot::{CalendarView, LoadingGuard, PassTicket, SnapshotHolder};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
