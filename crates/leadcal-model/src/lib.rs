//! Leadcal Model
//!
//! Read-only input types consumed by the aggregation engine.
//!
//! # Core Concepts
//!
//! - [`ContactEvent`]: one raw lead/contact record (date, owner, type, origin)
//! - [`SellerRecord`]: one entry of the active seller roster
//! - [`Period`]: the calendar month being aggregated
//! - [`DayKey`]: the day-level date parsed from an event
//! - [`ContactFilters`]: branch/state/status/origin selection
//! - [`LiveUpdate`]: a create/delete message from the live feed
//!
//! # Example
//!
//! ```rust,ignore
//! use leadcal_model::{ContactEvent, Period};
//!
//! let period = Period::new(2026, 10)?;
//! let event = ContactEvent::new("2026-10-18").with_user("maria.santos");
//! assert_eq!(period.day_index(&event), Some(18));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod contact;
mod error;
mod filter;
mod live;
mod period;

pub use contact::{ContactEvent, ContactId, ContactKind, OwnerCandidates, SellerRecord};
pub use error::{ModelError, ModelResult};
pub use filter::{
    ContactFilters, FilterMatcher, FilterOption, ORIGIN_ALL, ORIGIN_OPTIONS, ORIGIN_UNSPECIFIED,
    STATUS_OPTIONS,
};
pub use live::{LiveAction, LiveUpdate, UpdateKind};
pub use period::{DayKey, Direction, Period};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
