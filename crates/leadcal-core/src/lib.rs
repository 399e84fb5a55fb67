//! Leadcal Core
//!
//! The [`CalendarEngine`] orchestrator and its collaborators.
//!
//! # Architecture
//!
//! ```text
//! ContactSource ─ roster + contacts ─→ CalendarEngine::sync ─→ SignatureGate ─→ ChunkedAggregator
//!                                            ↑                                        │
//! live frames ─→ run_live_feed ─→ apply_live ─→ IncrementalPatcher ─→ SnapshotHolder ←┘
//!                                                                          │
//!                                                          view() / subscribe()
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use leadcal_core::prelude::*;
//! use std::sync::Arc;
//!
//! let source = Arc::new(InMemorySource::from_json_files("roster.json", "contatos.json")?);
//! let engine = CalendarEngine::new(EngineConfig::default(), source);
//! engine.set_filters(ContactFilters::new().with_status("Ativo"));
//! let outcome = engine.sync().await?;
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod feed;
pub mod source;
pub mod synthetic;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{EngineConfig, IdentityConfig, LiveConfig};
pub use engine::{CalendarEngine, SyncOutcome};
pub use error::{ConfigError, EngineError, EngineResult, SourceError};
pub use feed::{decode_frame, frame_channel, FeedStatus, FeedSummary};
pub use source::{ContactSource, InMemorySource};
pub use synthetic::{generate, SyntheticData, SyntheticSpec};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving a [`CalendarEngine`](crate::CalendarEngine)
    pub use crate::clock::{Clock, FixedClock, SystemClock};
    pub use crate::config::EngineConfig;
    pub use crate::engine::{CalendarEngine, SyncOutcome};
    pub use crate::error::{EngineError, SourceError};
    pub use crate::feed::FeedStatus;
    pub use crate::source::{ContactSource, InMemorySource};
    pub use leadcal_engine::{
        CalendarComputed, CalendarView, ContactTypeStats, PatchOutcome, SellerRow, SkipReason,
    };
    pub use leadcal_model::{
        ContactEvent, ContactFilters, Direction, LiveAction, LiveUpdate, Period, SellerRecord,
    };
}
