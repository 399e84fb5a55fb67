//! Stable snapshot holder
//!
//! The current [`CalendarComputed`] is the only shared mutable resource. It
//! is replaced wholesale, under one lock that also guards the generation
//! check, so readers never observe a torn matrix and a stale pass can never
//! publish over a newer one.

use crate::calendar::CalendarComputed;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// Generation captured by one aggregation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PassTicket {
    generation: u64,
}

impl PassTicket {
    #[inline]
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What consumers should display
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarView {
    /// Nothing has ever been published
    Loading,
    /// Last published snapshot; `refreshing` while a newer one is in flight
    Ready {
        snapshot: Arc<CalendarComputed>,
        refreshing: bool,
    },
}

impl CalendarView {
    /// Snapshot to render, if any
    #[inline]
    #[must_use]
    pub fn snapshot(&self) -> Option<&Arc<CalendarComputed>> {
        match self {
            Self::Loading => None,
            Self::Ready { snapshot, .. } => Some(snapshot),
        }
    }
}

/// Marks a load in flight until dropped
#[derive(Debug)]
pub struct LoadingGuard<'a> {
    in_flight: &'a AtomicUsize,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Holder of the last published snapshot
#[derive(Debug)]
pub struct SnapshotHolder {
    generation: AtomicU64,
    in_flight: AtomicUsize,
    current: Mutex<Option<Arc<CalendarComputed>>>,
    tx: watch::Sender<Option<Arc<CalendarComputed>>>,
}

impl SnapshotHolder {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            generation: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
            current: Mutex::new(None),
            tx,
        }
    }

    /// Start a pass, superseding every pass started before it
    pub fn begin_pass(&self) -> PassTicket {
        let _guard = self.current.lock();
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        PassTicket { generation }
    }

    /// Whether `ticket` still belongs to the newest pass
    #[inline]
    #[must_use]
    pub fn is_current(&self, ticket: &PassTicket) -> bool {
        self.generation.load(Ordering::Acquire) == ticket.generation
    }

    /// Newest generation handed out
    #[inline]
    #[must_use]
    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Replace the snapshot if `ticket` is still current
    ///
    /// Returns the published snapshot, or `None` when the pass was superseded.
    pub fn publish(
        &self,
        ticket: &PassTicket,
        computed: CalendarComputed,
    ) -> Option<Arc<CalendarComputed>> {
        let mut current = self.current.lock();
        if !self.is_current(ticket) {
            return None;
        }
        let snapshot = Arc::new(computed);
        *current = Some(Arc::clone(&snapshot));
        self.tx.send_replace(Some(Arc::clone(&snapshot)));
        Some(snapshot)
    }

    /// Replace the snapshot with `f(current)` when `f` returns a value
    ///
    /// Does nothing when no snapshot exists. The previous snapshot object is
    /// never mutated. A replacement also starts a new generation under the
    /// same lock, so no pass that was in flight can publish over it.
    pub fn replace_with<F>(&self, f: F) -> Option<Arc<CalendarComputed>>
    where
        F: FnOnce(&CalendarComputed) -> Option<CalendarComputed>,
    {
        let mut current = self.current.lock();
        let next = Arc::new(f(current.as_deref()?)?);
        self.generation.fetch_add(1, Ordering::AcqRel);
        *current = Some(Arc::clone(&next));
        self.tx.send_replace(Some(Arc::clone(&next)));
        Some(next)
    }

    /// Last published snapshot
    #[inline]
    #[must_use]
    pub fn current(&self) -> Option<Arc<CalendarComputed>> {
        self.current.lock().clone()
    }

    #[inline]
    #[must_use]
    pub fn has_snapshot(&self) -> bool {
        self.current.lock().is_some()
    }

    /// Mark a load in flight until the guard drops
    #[must_use]
    pub fn begin_loading(&self) -> LoadingGuard<'_> {
        self.in_flight.fetch_add(1, Ordering::AcqRel);
        LoadingGuard {
            in_flight: &self.in_flight,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::Acquire) > 0
    }

    /// View for consumers: last good snapshot, or loading on first load
    #[must_use]
    pub fn view(&self) -> CalendarView {
        match self.current() {
            Some(snapshot) => CalendarView::Ready {
                snapshot,
                refreshing: self.is_loading(),
            },
            None => CalendarView::Loading,
        }
    }

    /// Receiver notified on every publish or patch
    #[inline]
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<CalendarComputed>>> {
        self.tx.subscribe()
    }
}

impl Default for SnapshotHolder {
    fn default() -> Self {
        Self::new()
    }
}
