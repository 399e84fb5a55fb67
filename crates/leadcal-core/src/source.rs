//! Data source collaborator
//!
//! [`ContactSource`] is the seam between the engine and whatever holds the
//! roster and raw contacts. [`InMemorySource`] backs tests, the CLI, and
//! offline replays from JSON dumps.

use crate::error::SourceError;
use leadcal_model::{ContactEvent, ContactFilters, ContactId, Period, SellerRecord};
use parking_lot::{Mutex, RwLock};
use std::path::Path;

/// Supplier of the roster and raw contacts for a period
#[async_trait::async_trait]
pub trait ContactSource: Send + Sync {
    /// Active sellers under the branch/state selection of `filters`
    async fn roster(&self, filters: &ContactFilters) -> Result<Vec<SellerRecord>, SourceError>;

    /// Raw contacts dated within `period`
    ///
    /// Status and origin filtering is left to the engine.
    async fn contacts(
        &self,
        period: Period,
        filters: &ContactFilters,
    ) -> Result<Vec<ContactEvent>, SourceError>;
}

/// Source holding everything in memory
#[derive(Debug, Default)]
pub struct InMemorySource {
    roster: RwLock<Vec<SellerRecord>>,
    events: RwLock<Vec<ContactEvent>>,
    fail_next: Mutex<Option<String>>,
}

impl InMemorySource {
    #[must_use]
    pub fn new(roster: Vec<SellerRecord>, events: Vec<ContactEvent>) -> Self {
        Self {
            roster: RwLock::new(roster),
            events: RwLock::new(events),
            fail_next: Mutex::new(None),
        }
    }

    /// Decode a roster array and a contacts array
    ///
    /// # Errors
    /// Returns [`SourceError`] when either document is not valid JSON
    pub fn from_json_str(roster: &str, events: &str) -> Result<Self, SourceError> {
        let roster: Vec<SellerRecord> = serde_json::from_str(roster)
            .map_err(|e| SourceError::with_source("invalid roster JSON", e))?;
        let events: Vec<ContactEvent> = serde_json::from_str(events)
            .map_err(|e| SourceError::with_source("invalid contacts JSON", e))?;
        Ok(Self::new(roster, events))
    }

    /// Load a roster file and a contacts file
    ///
    /// # Errors
    /// Returns [`SourceError`] when a file cannot be read or decoded
    pub fn from_json_files(
        roster: impl AsRef<Path>,
        events: impl AsRef<Path>,
    ) -> Result<Self, SourceError> {
        let read = |path: &Path| {
            std::fs::read_to_string(path).map_err(|e| {
                SourceError::with_source(format!("cannot read {}", path.display()), e)
            })
        };
        let source = Self::from_json_str(&read(roster.as_ref())?, &read(events.as_ref())?)?;
        tracing::debug!(
            sellers = source.roster.read().len(),
            contacts = source.events.read().len(),
            "json source loaded"
        );
        Ok(source)
    }

    /// Replace the roster
    pub fn set_roster(&self, roster: Vec<SellerRecord>) {
        *self.roster.write() = roster;
    }

    /// Append a contact
    pub fn push_event(&self, event: ContactEvent) {
        self.events.write().push(event);
    }

    /// Remove every contact with `id`, returning how many were removed
    pub fn remove_event(&self, id: &ContactId) -> usize {
        let mut events = self.events.write();
        let before = events.len();
        events.retain(|e| e.id.as_ref() != Some(id));
        before - events.len()
    }

    /// Make the next fetch fail with `message`
    pub fn fail_next(&self, message: impl Into<String>) {
        *self.fail_next.lock() = Some(message.into());
    }

    fn take_failure(&self) -> Result<(), SourceError> {
        match self.fail_next.lock().take() {
            Some(message) => Err(SourceError::message(message)),
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl ContactSource for InMemorySource {
    async fn roster(&self, filters: &ContactFilters) -> Result<Vec<SellerRecord>, SourceError> {
        self.take_failure()?;
        Ok(self
            .roster
            .read()
            .iter()
            .filter(|s| filters.admits_seller(s.branch.as_deref(), s.state.as_deref()))
            .cloned()
            .collect())
    }

    async fn contacts(
        &self,
        period: Period,
        _filters: &ContactFilters,
    ) -> Result<Vec<ContactEvent>, SourceError> {
        self.take_failure()?;
        Ok(self
            .events
            .read()
            .iter()
            .filter(|e| {
                e.day_key()
                    .is_some_and(|k| k.year == period.year() && k.month == period.month())
            })
            .cloned()
            .collect())
    }
}
