//! Chunked aggregator
//!
//! Full O(n) pass over the raw events of a period, processed in fixed-size
//! slices with one suspension point before each slice. Each pass carries a
//! [`PassTicket`]; a pass that finds a newer ticket issued aborts without
//! publishing.
//!
//! # Per-event rules
//!
//! 1. Skip events failing the status/origin filters.
//! 2. Skip events with a malformed date or a day outside the period.
//! 3. Resolve the owner (memoized per raw identifier for this pass).
//! 4. Count a resolved roster seller on its row and the day total; count
//!    anything else on the day total only (anonymous bucket).

use crate::calendar::{CalendarBuilder, CalendarComputed};
use crate::schedule::AggregationTuning;
use crate::snapshot::{PassTicket, SnapshotHolder};
use leadcal_identity::{SellerIndex, SellerResolver};
use leadcal_model::{ContactEvent, ContactFilters, FilterMatcher, Period};
use std::sync::Arc;
use std::time::Instant;

/// Inputs of one full pass
#[derive(Debug, Clone)]
pub struct AggregationInput {
    pub period: Period,
    pub filters: ContactFilters,
    /// Raw events for the period
    pub events: Arc<[ContactEvent]>,
    /// Resolution index of the active roster; rows follow its order
    pub index: Arc<SellerIndex>,
}

/// Counters for one pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassStats {
    /// Events looked at
    pub scanned: u64,
    /// Rejected by the status/origin filters
    pub filtered_out: u64,
    /// Malformed date, other month, or day out of range
    pub out_of_period: u64,
    /// Counted on a seller row
    pub attributed: u64,
    /// Counted on the day total only
    pub anonymous: u64,
    /// Slices processed
    pub slices: usize,
    /// Resolutions answered by the per-pass memo
    pub memo_hits: u64,
}

/// Result of [`ChunkedAggregator::run`]
#[derive(Debug, Clone)]
pub enum PassOutcome {
    /// The pass finished and its snapshot is now current
    Published {
        snapshot: Arc<CalendarComputed>,
        stats: PassStats,
    },
    /// A newer pass started; nothing was published
    Superseded { generation: u64, slices_done: usize },
}

impl PassOutcome {
    /// Published snapshot, if any
    #[inline]
    #[must_use]
    pub fn snapshot(&self) -> Option<&Arc<CalendarComputed>> {
        match self {
            Self::Published { snapshot, .. } => Some(snapshot),
            Self::Superseded { .. } => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_superseded(&self) -> bool {
        matches!(self, Self::Superseded { .. })
    }
}

/// Full-scan aggregator publishing into a [`SnapshotHolder`]
#[derive(Debug, Clone)]
pub struct ChunkedAggregator {
    tuning: AggregationTuning,
    holder: Arc<SnapshotHolder>,
}

impl ChunkedAggregator {
    #[inline]
    #[must_use]
    pub fn new(tuning: AggregationTuning, holder: Arc<SnapshotHolder>) -> Self {
        Self { tuning, holder }
    }

    #[inline]
    #[must_use]
    pub fn tuning(&self) -> &AggregationTuning {
        &self.tuning
    }

    #[inline]
    #[must_use]
    pub fn holder(&self) -> &Arc<SnapshotHolder> {
        &self.holder
    }

    /// Start a new pass, superseding any pass in flight
    #[inline]
    pub fn begin(&self) -> PassTicket {
        self.holder.begin_pass()
    }

    /// Run a full pass for `ticket`
    ///
    /// Yields to the runtime before every slice and checks `ticket` after
    /// each yield and again at publish time.
    pub async fn run(&self, input: AggregationInput, ticket: PassTicket) -> PassOutcome {
        let started = Instant::now();
        let generation = ticket.generation();
        tracing::info!(
            generation,
            period = %input.period,
            events = input.events.len(),
            sellers = input.index.len(),
            "aggregation pass started"
        );
        metrics::counter!("leadcal_passes_started_total").increment(1);

        let mut builder = CalendarBuilder::new(input.period, input.index.names());
        let mut resolver = SellerResolver::new(Arc::clone(&input.index));
        let matcher = input.filters.matcher();
        let mut stats = PassStats::default();

        for slice in input.events.chunks(self.tuning.effective_slice_size()) {
            self.tuning.yield_strategy.yield_turn().await;
            if !self.holder.is_current(&ticket) {
                return self.superseded(generation, stats.slices);
            }
            for event in slice {
                tally(&mut builder, &mut resolver, &matcher, input.period, event, &mut stats);
            }
            stats.slices += 1;
        }
        stats.memo_hits = resolver.stats().memo_hits;

        let Some(snapshot) = self.holder.publish(&ticket, builder.finish()) else {
            return self.superseded(generation, stats.slices);
        };

        metrics::counter!("leadcal_passes_published_total").increment(1);
        metrics::counter!("leadcal_events_scanned_total").increment(stats.scanned);
        metrics::counter!("leadcal_events_anonymous_total").increment(stats.anonymous);
        tracing::info!(
            generation,
            grand_total = snapshot.grand_total(),
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "aggregation pass published"
        );
        tracing::debug!(generation, ?stats, "aggregation pass stats");

        PassOutcome::Published { snapshot, stats }
    }

    fn superseded(&self, generation: u64, slices_done: usize) -> PassOutcome {
        tracing::debug!(
            generation,
            newest = self.holder.current_generation(),
            slices_done,
            "aggregation pass superseded"
        );
        metrics::counter!("leadcal_passes_superseded_total").increment(1);
        PassOutcome::Superseded {
            generation,
            slices_done,
        }
    }
}

fn tally(
    builder: &mut CalendarBuilder,
    resolver: &mut SellerResolver,
    matcher: &FilterMatcher,
    period: Period,
    event: &ContactEvent,
    stats: &mut PassStats,
) {
    stats.scanned += 1;
    if !matcher.matches(event) {
        stats.filtered_out += 1;
        return;
    }
    let Some(day) = period.day_index(event) else {
        stats.out_of_period += 1;
        return;
    };
    let row = resolver
        .resolve(event)
        .and_then(|name| resolver.index().row_of(&name));
    if row.is_some() {
        stats.attributed += 1;
    } else {
        stats.anonymous += 1;
    }
    builder.record(day, row, event.kind());
}
