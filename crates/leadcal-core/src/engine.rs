//! Calendar engine
//!
//! Wires the data source, the signature gate, the chunked aggregator, the
//! incremental patcher, and the snapshot holder into one object consumers
//! drive with a handful of triggers.

use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::error::{EngineResult, SourceError};
use crate::feed::{decode_frame, FeedStatus, FeedSummary, FeedTracker};
use crate::source::ContactSource;
use futures::{Stream, StreamExt};
use leadcal_engine::{
    AggregationInput, CalendarComputed, CalendarView, ChunkedAggregator, ContactTypeStats,
    GateDecision, IncrementalPatcher, PassOutcome, PassTicket, PatchContext, PatchOutcome,
    Signature, SignatureGate, SnapshotHolder,
};
use leadcal_identity::{RosterIndexCache, SellerIndex};
use leadcal_model::{ContactFilters, Direction, LiveUpdate, Period};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tokio::sync::watch;

/// Result of [`CalendarEngine::sync`]
#[derive(Debug, Clone)]
pub enum SyncOutcome {
    /// Inputs unchanged; the current snapshot stands
    Reused(Arc<CalendarComputed>),
    /// A full pass published a new snapshot
    Recomputed(Arc<CalendarComputed>),
    /// A newer sync started before this one could publish
    Superseded,
}

impl SyncOutcome {
    /// Snapshot current after this sync, if it produced or kept one
    #[inline]
    #[must_use]
    pub fn snapshot(&self) -> Option<&Arc<CalendarComputed>> {
        match self {
            Self::Reused(s) | Self::Recomputed(s) => Some(s),
            Self::Superseded => None,
        }
    }
}

#[derive(Debug, Clone)]
struct Selection {
    period: Period,
    filters: ContactFilters,
    refresh_token: u64,
}

/// Gate plus the generation of the pass its stored signature is waiting on
///
/// Reuse is only allowed once that pass has published, so a superseded pass
/// can never leave the gate pointing at a snapshot that does not exist.
#[derive(Debug, Default)]
struct GateState {
    gate: SignatureGate,
    pending: Option<u64>,
}

/// Seller-by-day lead calendar for one displayed month
pub struct CalendarEngine {
    config: EngineConfig,
    source: Arc<dyn ContactSource>,
    clock: Arc<dyn Clock>,
    holder: Arc<SnapshotHolder>,
    aggregator: ChunkedAggregator,
    patcher: IncrementalPatcher,
    index_cache: RosterIndexCache,
    selection: RwLock<Selection>,
    gate: Mutex<GateState>,
    /// Index behind the current snapshot, used by live patches
    active_index: RwLock<Option<Arc<SellerIndex>>>,
    last_error: RwLock<Option<SourceError>>,
    feed: FeedTracker,
}

impl std::fmt::Debug for CalendarEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CalendarEngine")
            .field("config", &self.config)
            .field("period", &self.selection.read().period)
            .field("generation", &self.holder.current_generation())
            .finish_non_exhaustive()
    }
}

impl CalendarEngine {
    /// Engine showing the current month on the system clock
    #[must_use]
    pub fn new(config: EngineConfig, source: Arc<dyn ContactSource>) -> Self {
        Self::with_clock(config, source, Arc::new(SystemClock))
    }

    /// Engine with an explicit clock; the initial period is the clock's month
    #[must_use]
    pub fn with_clock(
        config: EngineConfig,
        source: Arc<dyn ContactSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let holder = Arc::new(SnapshotHolder::new());
        let period = Period::containing(clock.today());
        Self {
            aggregator: ChunkedAggregator::new(config.aggregation, Arc::clone(&holder)),
            patcher: IncrementalPatcher::new(Arc::clone(&holder)),
            index_cache: RosterIndexCache::new(config.identity.index_cache_capacity),
            selection: RwLock::new(Selection {
                period,
                filters: ContactFilters::default(),
                refresh_token: 0,
            }),
            gate: Mutex::new(GateState::default()),
            active_index: RwLock::new(None),
            last_error: RwLock::new(None),
            feed: FeedTracker::default(),
            config,
            source,
            clock,
            holder,
        }
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Displayed month
    #[must_use]
    pub fn period(&self) -> Period {
        self.selection.read().period
    }

    /// Change the displayed month; takes effect on the next sync
    pub fn set_period(&self, period: Period) {
        self.selection.write().period = period;
    }

    /// Move one month back or forward, returning the new period
    pub fn navigate(&self, direction: Direction) -> Period {
        let mut selection = self.selection.write();
        selection.period = selection.period.navigate(direction);
        selection.period
    }

    #[must_use]
    pub fn filters(&self) -> ContactFilters {
        self.selection.read().filters.clone()
    }

    /// Replace the filters; takes effect on the next sync
    pub fn set_filters(&self, filters: ContactFilters) {
        self.selection.write().filters = filters;
    }

    /// Fetch inputs and publish a fresh snapshot unless the gate allows reuse
    ///
    /// # Errors
    /// Returns [`EngineError::Source`](crate::error::EngineError::Source)
    /// when the data source fails. The error
    /// is also kept for [`last_error`](Self::last_error); the previous
    /// snapshot stays visible.
    pub async fn sync(&self) -> EngineResult<SyncOutcome> {
        let ticket = self.holder.begin_pass();
        let _loading = self.holder.begin_loading();
        let selection = self.selection.read().clone();

        let fetched = async {
            let roster = self.source.roster(&selection.filters).await?;
            let events = self
                .source
                .contacts(selection.period, &selection.filters)
                .await?;
            Ok::<_, SourceError>((roster, events))
        }
        .await;
        let (roster, events) = match fetched {
            Ok(inputs) => inputs,
            Err(e) => {
                tracing::error!(error = %e, period = %selection.period, "sync failed");
                metrics::counter!("leadcal_sync_errors_total").increment(1);
                *self.last_error.write() = Some(e.clone());
                return Err(e.into());
            }
        };

        if !self.holder.is_current(&ticket) {
            tracing::debug!(generation = ticket.generation(), "sync superseded during fetch");
            return Ok(SyncOutcome::Superseded);
        }

        let index = self.index_cache.get_or_build(&roster);
        let signature = Signature {
            period: selection.period,
            filters: selection.filters.clone(),
            roster_len: roster.len(),
            event_count: events.len(),
            update_id: self.feed.last_update_id(),
            refresh_token: selection.refresh_token,
        };

        if self.evaluate(signature, &ticket) == GateDecision::Reuse {
            *self.last_error.write() = None;
            if let Some(snapshot) = self.holder.current() {
                metrics::counter!("leadcal_sync_reused_total").increment(1);
                return Ok(SyncOutcome::Reused(snapshot));
            }
        }

        let input = AggregationInput {
            period: selection.period,
            filters: selection.filters,
            events: events.into(),
            index: Arc::clone(&index),
        };
        match self.aggregator.run(input, ticket).await {
            PassOutcome::Published { snapshot, .. } => {
                *self.active_index.write() = Some(index);
                *self.last_error.write() = None;
                let mut state = self.gate.lock();
                if state.pending == Some(ticket.generation()) {
                    state.pending = None;
                }
                Ok(SyncOutcome::Recomputed(snapshot))
            }
            PassOutcome::Superseded { .. } => Ok(SyncOutcome::Superseded),
        }
    }

    fn evaluate(&self, signature: Signature, ticket: &PassTicket) -> GateDecision {
        let mut state = self.gate.lock();
        let settled = state.pending.is_none() && self.holder.has_snapshot();
        let decision = state.gate.evaluate(signature, settled);
        if decision == GateDecision::Recompute {
            state.pending = Some(ticket.generation());
        }
        decision
    }

    /// Bump the manual refresh token and sync, forcing a full pass
    ///
    /// # Errors
    /// Same as [`sync`](Self::sync)
    pub async fn force_full_sync(&self) -> EngineResult<SyncOutcome> {
        let token = {
            let mut selection = self.selection.write();
            selection.refresh_token += 1;
            selection.refresh_token
        };
        tracing::info!(refresh_token = token, "full resync requested");
        self.sync().await
    }

    /// Lightweight refresh: re-fetch and let the gate decide
    ///
    /// # Errors
    /// Same as [`sync`](Self::sync)
    pub async fn refresh(&self) -> EngineResult<SyncOutcome> {
        self.sync().await
    }

    /// Apply one live update
    ///
    /// Contacts updates always advance the update id seen by the signature,
    /// whether or not they can be patched in place. A patched update also
    /// supersedes any sync still aggregating older inputs; the next sync
    /// recomputes.
    pub fn apply_live(&self, update: &LiveUpdate) -> PatchOutcome {
        if update.is_contacts_update() {
            let id = self.feed.record(update.update_id, self.clock.now());
            tracing::trace!(update_id = id, "live update recorded");
        }
        let selection = self.selection.read().clone();
        let matcher = selection.filters.matcher();
        let index = self.active_index.read().clone();
        let ctx = PatchContext {
            period: selection.period,
            today: self.clock.today(),
            matcher: &matcher,
            index: index.as_deref(),
        };
        self.patcher.apply(update, &ctx)
    }

    /// Consume a stream of raw JSON frames until it ends
    ///
    /// Undecodable frames are logged and skipped. With
    /// `live.resync_on_update` set, every contacts update is followed by a
    /// sync so non-patchable changes are reconciled.
    pub async fn run_live_feed<S>(&self, frames: S) -> FeedSummary
    where
        S: Stream<Item = String>,
    {
        let mut frames = std::pin::pin!(frames);
        let mut summary = FeedSummary::default();
        self.feed.set_connected(true);
        tracing::info!("live feed connected");

        while let Some(frame) = frames.next().await {
            summary.frames += 1;
            let update = match decode_frame(&frame) {
                Ok(update) => update,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        len = frame.len(),
                        "dropping undecodable live frame"
                    );
                    metrics::counter!("leadcal_live_frames_rejected_total").increment(1);
                    summary.rejected += 1;
                    continue;
                }
            };
            if self.apply_live(&update).is_applied() {
                summary.patched += 1;
            }
            if self.config.live.resync_on_update && update.is_contacts_update() {
                summary.resyncs += 1;
                if let Err(e) = self.sync().await {
                    tracing::warn!(error = %e, "resync after live update failed");
                }
            }
        }

        self.feed.set_connected(false);
        tracing::info!(?summary, "live feed disconnected");
        summary
    }

    /// What consumers should display
    #[must_use]
    pub fn view(&self) -> CalendarView {
        self.holder.view()
    }

    /// Last published snapshot
    #[must_use]
    pub fn current(&self) -> Option<Arc<CalendarComputed>> {
        self.holder.current()
    }

    /// Per-type contact counts of the current snapshot
    #[must_use]
    pub fn statistics(&self) -> Option<ContactTypeStats> {
        self.holder.current().map(|s| s.statistics())
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.holder.is_loading()
    }

    /// Error of the last failed sync, cleared by the next successful one
    #[must_use]
    pub fn last_error(&self) -> Option<SourceError> {
        self.last_error.read().clone()
    }

    /// Receiver notified on every publish or patch
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<CalendarComputed>>> {
        self.holder.subscribe()
    }

    #[must_use]
    pub fn feed_status(&self) -> FeedStatus {
        self.feed
            .status(self.clock.now(), self.config.live.recent_window())
    }
}
