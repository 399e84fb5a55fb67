//! Seller-by-day lead matrix
//!
//! Every per-day array is dense and indexed by day of month, with index 0
//! unused, so per-event updates are O(1) and memory is bounded by
//! `days_in_month × sellers`.

use leadcal_model::{ContactKind, Period};
use std::sync::Arc;

/// Per-seller row: day-indexed counts plus a running total
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SellerRow {
    id: Arc<str>,
    leads: Box<[u32]>,
    total: u64,
}

impl SellerRow {
    fn zeroed(id: Arc<str>, slots: usize) -> Self {
        Self {
            id,
            leads: vec![0; slots].into_boxed_slice(),
            total: 0,
        }
    }

    /// Canonical seller name
    #[inline]
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Shared handle to the canonical name
    #[inline]
    #[must_use]
    pub fn id_arc(&self) -> &Arc<str> {
        &self.id
    }

    /// Day-indexed counts (index 0 unused)
    #[inline]
    #[must_use]
    pub fn leads(&self) -> &[u32] {
        &self.leads
    }

    /// Count on `day`, 0 when out of range
    #[inline]
    #[must_use]
    pub fn count(&self, day: usize) -> u32 {
        self.leads.get(day).copied().unwrap_or(0)
    }

    /// Running total across the month
    #[inline]
    #[must_use]
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Copy of this row with `delta` applied to `day`, clamped at zero
    ///
    /// The total moves by the amount the day count actually moved.
    fn with_delta(&self, day: usize, delta: i64) -> Self {
        let mut leads = self.leads.clone();
        let before = leads[day];
        let after = shift_u32(before, delta);
        leads[day] = after;
        let moved = i64::from(after) - i64::from(before);
        Self {
            id: Arc::clone(&self.id),
            leads,
            total: shift_u64(self.total, moved),
        }
    }
}

/// Counted contacts by contact type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContactTypeStats {
    /// "Ativo" contacts
    pub active: u64,
    /// "Receptivo" contacts
    pub receptive: u64,
    /// Every counted contact, whatever its type
    pub total: u64,
}

impl ContactTypeStats {
    fn shifted(self, kind: ContactKind, delta: i64) -> Self {
        let mut next = self;
        match kind {
            ContactKind::Active => next.active = shift_u64(next.active, delta),
            ContactKind::Receptive => next.receptive = shift_u64(next.receptive, delta),
            ContactKind::Other => {}
        }
        next.total = shift_u64(next.total, delta);
        next
    }
}

/// Aggregate snapshot for one month
///
/// Rows are in roster order. `daily_totals[d]` counts attributed and
/// anonymous events of day `d`; `grand_total` is their sum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarComputed {
    period: Period,
    sellers: Vec<Arc<SellerRow>>,
    daily_totals: Box<[u64]>,
    grand_total: u64,
    stats: ContactTypeStats,
}

impl CalendarComputed {
    /// Zeroed snapshot with one row per name
    #[must_use]
    pub fn empty(period: Period, names: &[Arc<str>]) -> Self {
        CalendarBuilder::new(period, names).finish()
    }

    #[inline]
    #[must_use]
    pub fn period(&self) -> Period {
        self.period
    }

    #[inline]
    #[must_use]
    pub fn days_in_month(&self) -> usize {
        self.daily_totals.len().saturating_sub(1)
    }

    /// Rows in roster order
    #[inline]
    #[must_use]
    pub fn sellers(&self) -> &[Arc<SellerRow>] {
        &self.sellers
    }

    /// Row for canonical `name`
    #[must_use]
    pub fn seller(&self, name: &str) -> Option<&SellerRow> {
        self.row_position(name).map(|i| self.sellers[i].as_ref())
    }

    /// Position of the row for canonical `name`
    #[inline]
    #[must_use]
    pub fn row_position(&self, name: &str) -> Option<usize> {
        self.sellers.iter().position(|row| row.id() == name)
    }

    /// Day-indexed totals (index 0 unused)
    #[inline]
    #[must_use]
    pub fn daily_totals(&self) -> &[u64] {
        &self.daily_totals
    }

    /// Total on `day`, 0 when out of range
    #[inline]
    #[must_use]
    pub fn day_total(&self, day: usize) -> u64 {
        self.daily_totals.get(day).copied().unwrap_or(0)
    }

    #[inline]
    #[must_use]
    pub fn grand_total(&self) -> u64 {
        self.grand_total
    }

    /// Counted contacts split by contact type
    #[inline]
    #[must_use]
    pub fn statistics(&self) -> ContactTypeStats {
        self.stats
    }

    /// Events on `day` not attributed to any row
    #[must_use]
    pub fn anonymous_on(&self, day: usize) -> u64 {
        let attributed: u64 = self.sellers.iter().map(|r| u64::from(r.count(day))).sum();
        self.day_total(day).saturating_sub(attributed)
    }

    /// Events in the month not attributed to any row
    #[must_use]
    pub fn anonymous_total(&self) -> u64 {
        (1..=self.days_in_month()).map(|d| self.anonymous_on(d)).sum()
    }

    /// Sum of all row totals
    #[must_use]
    pub fn attributed_total(&self) -> u64 {
        self.sellers.iter().map(|r| r.total()).sum()
    }

    /// Whether the matrix reconciles
    ///
    /// Checks that every row total equals the sum of its days, that no day
    /// has more attributed events than its total, and that the grand total is
    /// the sum of the daily totals. The per-type statistics must cover
    /// exactly the grand total.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let days = 1..=self.days_in_month();
        let rows_ok = self.sellers.iter().all(|row| {
            row.leads.len() == self.daily_totals.len()
                && row.leads[0] == 0
                && days.clone().map(|d| u64::from(row.count(d))).sum::<u64>() == row.total()
        });
        let days_ok = days.clone().all(|d| {
            let attributed: u64 = self.sellers.iter().map(|r| u64::from(r.count(d))).sum();
            attributed <= self.day_total(d)
        });
        let grand_ok = days.map(|d| self.day_total(d)).sum::<u64>() == self.grand_total;
        let stats_ok = self.stats.total == self.grand_total
            && self.stats.active + self.stats.receptive <= self.stats.total;
        rows_ok && days_ok && grand_ok && stats_ok && self.daily_totals[0] == 0
    }

    /// Shallow copy with `delta` contacts of `kind` applied to `day`
    ///
    /// Only the touched row is re-allocated; the other rows are shared with
    /// `self`. Row, day, grand and per-type totals are clamped at zero.
    #[must_use]
    pub(crate) fn with_delta(
        &self,
        day: usize,
        row: Option<usize>,
        kind: ContactKind,
        delta: i64,
    ) -> Self {
        let mut sellers = self.sellers.clone();
        if let Some(pos) = row {
            sellers[pos] = Arc::new(sellers[pos].with_delta(day, delta));
        }
        let mut daily_totals = self.daily_totals.clone();
        let before = daily_totals[day];
        daily_totals[day] = shift_u64(before, delta);
        // Grand and per-type totals follow the day total, not the raw delta.
        let moved = signed_move(before, daily_totals[day]);
        Self {
            period: self.period,
            sellers,
            daily_totals,
            grand_total: shift_u64(self.grand_total, moved),
            stats: self.stats.shifted(kind, moved),
        }
    }
}

/// Mutable accumulator for one full pass
#[derive(Debug)]
pub(crate) struct CalendarBuilder {
    period: Period,
    rows: Vec<SellerRow>,
    daily: Vec<u64>,
    stats: ContactTypeStats,
}

impl CalendarBuilder {
    pub(crate) fn new(period: Period, names: &[Arc<str>]) -> Self {
        let slots = period.slot_count();
        Self {
            period,
            rows: names
                .iter()
                .map(|name| SellerRow::zeroed(Arc::clone(name), slots))
                .collect(),
            daily: vec![0; slots],
            stats: ContactTypeStats::default(),
        }
    }

    /// Count one event of `kind` on `day`, attributed to `row` when known
    #[inline]
    pub(crate) fn record(&mut self, day: usize, row: Option<usize>, kind: ContactKind) {
        if let Some(row) = row.and_then(|pos| self.rows.get_mut(pos)) {
            row.leads[day] = row.leads[day].saturating_add(1);
            row.total += 1;
        }
        self.daily[day] += 1;
        self.stats = self.stats.shifted(kind, 1);
    }

    pub(crate) fn finish(self) -> CalendarComputed {
        let grand_total = self.daily.iter().skip(1).sum();
        CalendarComputed {
            period: self.period,
            sellers: self.rows.into_iter().map(Arc::new).collect(),
            daily_totals: self.daily.into_boxed_slice(),
            grand_total,
            stats: self.stats,
        }
    }
}

fn shift_u64(value: u64, delta: i64) -> u64 {
    if delta >= 0 {
        value.saturating_add(delta.unsigned_abs())
    } else {
        value.saturating_sub(delta.unsigned_abs())
    }
}

fn signed_move(before: u64, after: u64) -> i64 {
    let moved = i64::try_from(before.abs_diff(after)).unwrap_or(i64::MAX);
    if after >= before {
        moved
    } else {
        -moved
    }
}

fn shift_u32(value: u32, delta: i64) -> u32 {
    u32::try_from(shift_u64(u64::from(value), delta)).unwrap_or(u32::MAX)
}
