//! Matrix invariants over generated workloads

use chrono::NaiveDate;
use leadcal_engine::{
    patch_snapshot, AggregationInput, AggregationTuning, CalendarComputed, ChunkedAggregator,
    PassOutcome, PatchContext, SnapshotHolder,
};
use leadcal_identity::SellerIndex;
use leadcal_model::{ContactEvent, ContactFilters, LiveUpdate, Period};
use leadcal_test_utils::{
    five_seller_owner_spellings, five_seller_roster, mixed_events, reference_tally,
    UNRESOLVABLE_OWNER,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::sync::Arc;

fn period() -> Period {
    Period::new(2026, 10).unwrap()
}

fn aggregate(events: Vec<ContactEvent>, filters: ContactFilters, slice: usize) -> CalendarComputed {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap();
    let aggregator = ChunkedAggregator::new(
        AggregationTuning::new().with_slice_size(slice),
        Arc::new(SnapshotHolder::new()),
    );
    let input = AggregationInput {
        period: period(),
        filters,
        events: events.into(),
        index: Arc::new(SellerIndex::build(&five_seller_roster())),
    };
    let ticket = aggregator.begin();
    match rt.block_on(aggregator.run(input, ticket)) {
        PassOutcome::Published { snapshot, .. } => (*snapshot).clone(),
        PassOutcome::Superseded { .. } => panic!("single pass cannot be superseded"),
    }
}

fn owner_strategy() -> impl Strategy<Value = String> {
    let mut owners: Vec<String> = five_seller_owner_spellings()
        .iter()
        .map(|s| (*s).to_string())
        .collect();
    owners.push(UNRESOLVABLE_OWNER.to_string());
    prop::sample::select(owners)
}

fn raw_date_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        8 => (1u32..=31).prop_map(|d| format!("2026-10-{d:02}")),
        1 => (1u32..=30).prop_map(|d| format!("2026-09-{d:02}")),
        1 => Just("2026-10-32".to_string()),
        1 => Just("2026-10-1".to_string()),
        1 => Just("2026-10-07T09:15:00".to_string()),
    ]
}

fn event_strategy() -> impl Strategy<Value = ContactEvent> {
    (
        raw_date_strategy(),
        owner_strategy(),
        prop::sample::select(vec!["Ativo", "Receptivo", "ativo"]),
        prop::option::of(prop::sample::select(vec!["email", "whatsapp", "EMAIL"])),
    )
        .prop_map(|(date, owner, status, origin)| {
            let event = ContactEvent::new(date)
                .with_user(owner)
                .with_contact_type(status);
            match origin {
                Some(origin) => event.with_origin(origin),
                None => event,
            }
        })
}

fn filters_strategy() -> impl Strategy<Value = ContactFilters> {
    (
        prop::option::of(prop::sample::select(vec!["Ativo", "Receptivo"])),
        prop::option::of(prop::sample::select(vec!["email", "nao_informado", "todos"])),
    )
        .prop_map(|(status, origin)| {
            let mut filters = ContactFilters::new();
            if let Some(status) = status {
                filters = filters.with_status(status);
            }
            if let Some(origin) = origin {
                filters = filters.with_origin(origin);
            }
            filters
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn daily_totals_reconcile_with_rows(
        events in prop::collection::vec(event_strategy(), 0..400),
        filters in filters_strategy(),
        slice in 1usize..64,
    ) {
        let snapshot = aggregate(events.clone(), filters.clone(), slice);
        prop_assert!(snapshot.is_consistent());

        for day in 1..=snapshot.days_in_month() {
            let rows: u64 = snapshot.sellers().iter().map(|r| u64::from(r.count(day))).sum();
            prop_assert_eq!(snapshot.day_total(day), rows + snapshot.anonymous_on(day));
        }
        let days: u64 = snapshot.daily_totals()[1..].iter().sum();
        prop_assert_eq!(snapshot.grand_total(), days);

        let expected = reference_tally(period(), &filters, &five_seller_roster(), &events);
        prop_assert_eq!(snapshot.daily_totals(), expected.daily.as_slice());
        prop_assert_eq!(snapshot.attributed_total(), expected.attributed());
        let stats = snapshot.statistics();
        prop_assert_eq!((stats.active, stats.receptive), (expected.active, expected.receptive));
        prop_assert_eq!(stats.total, expected.grand);
    }

    #[test]
    fn slice_size_does_not_change_result(
        events in prop::collection::vec(event_strategy(), 0..300),
        slice in 1usize..50,
    ) {
        let sliced = aggregate(events.clone(), ContactFilters::new(), slice);
        let whole = aggregate(events, ContactFilters::new(), usize::MAX);
        prop_assert_eq!(sliced, whole);
    }

    #[test]
    fn create_then_delete_restores_matrix(
        events in prop::collection::vec(event_strategy(), 0..200),
        owner in owner_strategy(),
        day in 1u32..=31,
    ) {
        let before = aggregate(events, ContactFilters::new(), 32);
        let index = SellerIndex::build(&five_seller_roster());
        let matcher = ContactFilters::new().matcher();
        let ctx = PatchContext {
            period: period(),
            today: NaiveDate::from_ymd_opt(2026, 10, day).unwrap(),
            matcher: &matcher,
            index: Some(&index),
        };
        let payload = ContactEvent::new(format!("2026-10-{day:02}")).with_user(owner);

        let create = LiveUpdate::create(payload.clone(), 1);
        let (created, ..) = patch_snapshot(&before, &create, &ctx).unwrap();
        let (restored, ..) = patch_snapshot(&created, &LiveUpdate::delete(payload, 2), &ctx).unwrap();

        prop_assert_eq!(created.grand_total(), before.grand_total() + 1);
        prop_assert_eq!(restored, before);
    }

    #[test]
    fn deletes_never_go_below_zero(
        events in prop::collection::vec(event_strategy(), 0..60),
        deletes in prop::collection::vec((owner_strategy(), 1u32..=31), 1..80),
    ) {
        let mut snapshot = aggregate(events, ContactFilters::new(), 16);
        let index = SellerIndex::build(&five_seller_roster());
        let matcher = ContactFilters::new().matcher();

        for (owner, day) in deletes {
            let ctx = PatchContext {
                period: period(),
                today: NaiveDate::from_ymd_opt(2026, 10, day).unwrap(),
                matcher: &matcher,
                index: Some(&index),
            };
            let payload = ContactEvent::new(format!("2026-10-{day:02}")).with_user(owner);
            let before_day = snapshot.day_total(day as usize);
            let delete = LiveUpdate::delete(payload, 1);
            let (next, ..) = patch_snapshot(&snapshot, &delete, &ctx).unwrap();
            prop_assert_eq!(next.day_total(day as usize), before_day.saturating_sub(1));
            for row in next.sellers() {
                let days: u64 = row.leads()[1..].iter().map(|c| u64::from(*c)).sum();
                prop_assert_eq!(row.total(), days);
            }
            snapshot = next;
        }
    }
}

#[test]
fn ten_thousand_events_reconcile() {
    let (events, malformed) = mixed_events(period(), 10_000, 37);
    let snapshot = aggregate(events, ContactFilters::new(), 6000);

    let unresolvable = 10_000 / 6;
    assert!(malformed > 0);
    assert_eq!(
        snapshot.attributed_total() + snapshot.anonymous_total(),
        10_000 - malformed as u64
    );
    assert_eq!(snapshot.grand_total(), 10_000 - malformed as u64);
    assert!(snapshot.anonymous_total() <= unresolvable as u64);
    assert!(snapshot.anonymous_total() > 0);
    assert_eq!(snapshot.sellers().len(), 5);
    assert!(snapshot.sellers().iter().all(|row| row.total() > 0));
    assert!(snapshot.is_consistent());
}

#[test]
fn loose_match_resolves_dotted_login() {
    let index = SellerIndex::build(&leadcal_test_utils::maria_roster());
    let event = ContactEvent::new("2026-10-18").with_user("maria.santos");
    assert_eq!(index.resolve(&event).as_deref(), Some("Maria Dos Santos"));
}
