//! Incremental patcher
//!
//! Applies a single same-day live create/delete directly onto the current
//! snapshot. Anything it cannot patch is left for the next full pass, which
//! the update id in the signature guarantees.

use crate::calendar::CalendarComputed;
use crate::snapshot::SnapshotHolder;
use chrono::NaiveDate;
use leadcal_identity::SellerIndex;
use leadcal_model::{ContactEvent, ContactKind, FilterMatcher, LiveUpdate, Period};
use std::sync::Arc;

/// Why an update was not patched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Not a contacts update
    NotContactsUpdate,
    /// Action other than create/delete
    UnpatchableAction,
    /// No contact payload
    MissingPayload,
    /// Displayed month is not the current month
    NotCurrentMonth,
    /// Payload date missing or malformed
    MalformedDate,
    /// Payload dated another day than today
    NotToday,
    /// Payload rejected by the active status/origin filters
    FilteredOut,
    /// No snapshot with at least one row, or one for another month
    NoSnapshot,
}

impl SkipReason {
    /// Stable label for logs and metrics
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotContactsUpdate => "not_contacts_update",
            Self::UnpatchableAction => "unpatchable_action",
            Self::MissingPayload => "missing_payload",
            Self::NotCurrentMonth => "not_current_month",
            Self::MalformedDate => "malformed_date",
            Self::NotToday => "not_today",
            Self::FilteredOut => "filtered_out",
            Self::NoSnapshot => "no_snapshot",
        }
    }
}

/// Result of one patch attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOutcome {
    /// Snapshot replaced
    Applied {
        day: usize,
        /// Matched row, `None` when only the totals moved
        seller: Option<Arc<str>>,
        delta: i64,
        snapshot: Arc<CalendarComputed>,
    },
    /// Nothing changed
    Skipped(SkipReason),
}

impl PatchOutcome {
    #[inline]
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

/// Inputs the patch is checked against
#[derive(Debug, Clone, Copy)]
pub struct PatchContext<'a> {
    /// Displayed month
    pub period: Period,
    /// Today's date
    pub today: NaiveDate,
    /// Active status/origin filters
    pub matcher: &'a FilterMatcher,
    /// Index of the roster behind the current snapshot
    pub index: Option<&'a SellerIndex>,
}

/// Validated single-cell change
#[derive(Debug, Clone, PartialEq, Eq)]
struct PatchPlan {
    day: usize,
    owner: Option<Arc<str>>,
    kind: ContactKind,
    delta: i64,
}

/// Compute the patched snapshot for `update`
///
/// Pure: `snapshot` is left untouched and the result shares every row
/// except the one touched.
///
/// # Errors
/// Returns the first failed precondition
pub fn patch_snapshot(
    snapshot: &CalendarComputed,
    update: &LiveUpdate,
    ctx: &PatchContext<'_>,
) -> Result<(CalendarComputed, Option<Arc<str>>, usize, i64), SkipReason> {
    let plan = plan(update, ctx)?;
    if snapshot.sellers().is_empty() || snapshot.period() != ctx.period {
        return Err(SkipReason::NoSnapshot);
    }
    let row = plan
        .owner
        .as_deref()
        .and_then(|name| snapshot.row_position(name));
    let seller = row.map(|pos| Arc::clone(snapshot.sellers()[pos].id_arc()));
    let next = snapshot.with_delta(plan.day, row, plan.kind, plan.delta);
    Ok((next, seller, plan.day, plan.delta))
}

fn plan(update: &LiveUpdate, ctx: &PatchContext<'_>) -> Result<PatchPlan, SkipReason> {
    if !update.is_contacts_update() {
        return Err(SkipReason::NotContactsUpdate);
    }
    let delta = update.action.delta().ok_or(SkipReason::UnpatchableAction)?;
    let payload = update.data.as_ref().ok_or(SkipReason::MissingPayload)?;
    if !ctx.period.contains(ctx.today) {
        return Err(SkipReason::NotCurrentMonth);
    }
    let key = payload.day_key().ok_or(SkipReason::MalformedDate)?;
    let day = ctx.period.locate(key).ok_or(SkipReason::NotToday)?;
    if key != leadcal_model::DayKey::from_date(ctx.today) {
        return Err(SkipReason::NotToday);
    }
    if !ctx.matcher.matches(payload) {
        return Err(SkipReason::FilteredOut);
    }
    Ok(PatchPlan {
        day,
        owner: owner_name(payload, ctx.index),
        kind: payload.kind(),
        delta,
    })
}

/// Resolved canonical name, falling back to the raw owner identifier
fn owner_name(payload: &ContactEvent, index: Option<&SellerIndex>) -> Option<Arc<str>> {
    index
        .and_then(|index| index.resolve(payload))
        .or_else(|| payload.owner_key().map(Arc::from))
}

/// Applies live updates to a [`SnapshotHolder`]
#[derive(Debug, Clone)]
pub struct IncrementalPatcher {
    holder: Arc<SnapshotHolder>,
}

impl IncrementalPatcher {
    #[inline]
    #[must_use]
    pub fn new(holder: Arc<SnapshotHolder>) -> Self {
        Self { holder }
    }

    /// Patch the current snapshot with `update`
    ///
    /// Synchronous and never suspends. Any failed precondition is a no-op.
    /// An applied patch supersedes every pass still in flight, since those
    /// were fed inputs that predate the update.
    ///
    /// A payload with no owner identifier still moves the day and grand
    /// totals, counted in the anonymous bucket the way a full pass would
    /// count it.
    pub fn apply(&self, update: &LiveUpdate, ctx: &PatchContext<'_>) -> PatchOutcome {
        let mut applied = None;
        let mut skipped = SkipReason::NoSnapshot;

        let snapshot = self.holder.replace_with(|current| {
            match patch_snapshot(current, update, ctx) {
                Ok((next, seller, day, delta)) => {
                    applied = Some((seller, day, delta));
                    Some(next)
                }
                Err(reason) => {
                    skipped = reason;
                    None
                }
            }
        });

        match (snapshot, applied) {
            (Some(snapshot), Some((seller, day, delta))) => {
                metrics::counter!("leadcal_patches_applied_total").increment(1);
                tracing::debug!(
                    day,
                    delta,
                    seller = seller.as_deref().unwrap_or("<anonymous>"),
                    grand_total = snapshot.grand_total(),
                    "live patch applied"
                );
                PatchOutcome::Applied {
                    day,
                    seller,
                    delta,
                    snapshot,
                }
            }
            _ => {
                metrics::counter!("leadcal_patches_skipped_total", "reason" => skipped.as_str())
                    .increment(1);
                tracing::debug!(reason = skipped.as_str(), "live patch skipped");
                PatchOutcome::Skipped(skipped)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::CalendarBuilder;
    use leadcal_model::{ContactFilters, SellerRecord};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn index() -> SellerIndex {
        SellerIndex::build(&[
            SellerRecord::new("Maria Dos Santos").with_email("maria.santos@x.com"),
            SellerRecord::new("Carlos Souza"),
        ])
    }

    fn snapshot(index: &SellerIndex) -> CalendarComputed {
        let mut builder = CalendarBuilder::new(Period::new(2026, 10).unwrap(), index.names());
        builder.record(18, Some(0), ContactKind::Active);
        builder.record(18, None, ContactKind::Other);
        builder.finish()
    }

    fn today_event() -> ContactEvent {
        ContactEvent::new("2026-10-18").with_user("maria.santos")
    }

    fn run(update: &LiveUpdate, matcher: &FilterMatcher) -> Result<CalendarComputed, SkipReason> {
        let index = index();
        let ctx = PatchContext {
            period: Period::new(2026, 10).unwrap(),
            today: today(),
            matcher,
            index: Some(&index),
        };
        patch_snapshot(&snapshot(&index), update, &ctx).map(|(next, ..)| next)
    }

    #[test]
    fn create_increments_row_day_and_grand() {
        let next = run(&LiveUpdate::create(today_event(), 1), &FilterMatcher::default()).unwrap();
        assert_eq!(next.seller("Maria Dos Santos").unwrap().count(18), 2);
        assert_eq!(next.seller("Maria Dos Santos").unwrap().total(), 2);
        assert_eq!(next.day_total(18), 3);
        assert_eq!(next.grand_total(), 3);
    }

    #[test]
    fn unknown_owner_moves_totals_only() {
        let event = ContactEvent::new("2026-10-18").with_user("ghost");
        let next = run(&LiveUpdate::create(event, 1), &FilterMatcher::default()).unwrap();
        assert_eq!(next.attributed_total(), 1);
        assert_eq!(next.day_total(18), 3);
        assert_eq!(next.anonymous_on(18), 2);
    }

    #[test]
    fn ownerless_payload_moves_totals_only() {
        let event = ContactEvent::new("2026-10-18");
        let next = run(&LiveUpdate::delete(event, 1), &FilterMatcher::default()).unwrap();
        assert_eq!(next.day_total(18), 1);
        assert_eq!(next.attributed_total(), 1);
    }

    #[test]
    fn other_days_are_not_patched() {
        let event = ContactEvent::new("2026-10-17").with_user("maria.santos");
        let err = run(&LiveUpdate::create(event, 1), &FilterMatcher::default()).unwrap_err();
        assert_eq!(err, SkipReason::NotToday);
    }

    #[test]
    fn malformed_payload_date_is_skipped() {
        let event = ContactEvent::new("18/10/2026").with_user("maria.santos");
        let err = run(&LiveUpdate::create(event, 1), &FilterMatcher::default()).unwrap_err();
        assert_eq!(err, SkipReason::MalformedDate);
    }

    #[test]
    fn filters_apply_to_payload() {
        let matcher = ContactFilters::new().with_status("Receptivo").matcher();
        let event = today_event().with_contact_type("Ativo");
        let err = run(&LiveUpdate::create(event, 1), &matcher).unwrap_err();
        assert_eq!(err, SkipReason::FilteredOut);
    }

    #[test]
    fn unpatchable_actions_are_skipped() {
        let mut update = LiveUpdate::create(today_event(), 1);
        update.action = leadcal_model::LiveAction::Other;
        assert_eq!(
            run(&update, &FilterMatcher::default()).unwrap_err(),
            SkipReason::UnpatchableAction
        );
    }

    #[test]
    fn other_displayed_month_is_skipped() {
        let index = index();
        let matcher = FilterMatcher::default();
        let ctx = PatchContext {
            period: Period::new(2026, 9).unwrap(),
            today: today(),
            matcher: &matcher,
            index: Some(&index),
        };
        let err = patch_snapshot(&snapshot(&index), &LiveUpdate::create(today_event(), 1), &ctx)
            .unwrap_err();
        assert_eq!(err, SkipReason::NotCurrentMonth);
    }

    #[test]
    fn raw_owner_matches_row_without_index() {
        let index = index();
        let matcher = FilterMatcher::default();
        let ctx = PatchContext {
            period: Period::new(2026, 10).unwrap(),
            today: today(),
            matcher: &matcher,
            index: None,
        };
        let event = ContactEvent::new("2026-10-18").with_user("Carlos Souza");
        let (next, seller, ..) =
            patch_snapshot(&snapshot(&index), &LiveUpdate::create(event, 1), &ctx).unwrap();
        assert_eq!(seller.as_deref(), Some("Carlos Souza"));
        assert_eq!(next.seller("Carlos Souza").unwrap().count(18), 1);
    }

    #[test]
    fn patcher_requires_published_snapshot() {
        let holder = Arc::new(SnapshotHolder::new());
        let patcher = IncrementalPatcher::new(Arc::clone(&holder));
        let index = index();
        let matcher = FilterMatcher::default();
        let ctx = PatchContext {
            period: Period::new(2026, 10).unwrap(),
            today: today(),
            matcher: &matcher,
            index: Some(&index),
        };
        let outcome = patcher.apply(&LiveUpdate::create(today_event(), 1), &ctx);
        assert_eq!(outcome, PatchOutcome::Skipped(SkipReason::NoSnapshot));
    }

    #[test]
    fn patcher_keeps_previous_snapshot_intact() {
        let holder = Arc::new(SnapshotHolder::new());
        let index = index();
        let ticket = holder.begin_pass();
        let before = holder.publish(&ticket, snapshot(&index)).unwrap();

        let patcher = IncrementalPatcher::new(Arc::clone(&holder));
        let matcher = FilterMatcher::default();
        let ctx = PatchContext {
            period: Period::new(2026, 10).unwrap(),
            today: today(),
            matcher: &matcher,
            index: Some(&index),
        };
        let outcome = patcher.apply(&LiveUpdate::create(today_event(), 1), &ctx);

        assert!(outcome.is_applied());
        assert_eq!(before.grand_total(), 2);
        assert_eq!(holder.current().unwrap().grand_total(), 3);
    }
}
