//! Testing utilities for the Leadcal workspace
//!
//! Shared rosters, event builders, and a naive reference tally used as an
//! oracle against the chunked aggregator.

#![allow(missing_docs)]

use leadcal_identity::SellerIndex;
use leadcal_model::{ContactEvent, ContactFilters, Period, SellerRecord};
use std::sync::Once;

/// Owner identifier that matches nobody in [`five_seller_roster`]
pub const UNRESOLVABLE_OWNER: &str = "robo.integracao";

pub fn maria_roster() -> Vec<SellerRecord> {
    vec![SellerRecord::new("Maria Dos Santos").with_email("maria.santos@x.com")]
}

pub fn roster(names: &[&str]) -> Vec<SellerRecord> {
    names.iter().map(|name| SellerRecord::new(*name)).collect()
}

/// Five sellers with e-mails, two per branch
pub fn five_seller_roster() -> Vec<SellerRecord> {
    vec![
        SellerRecord::new("Maria Dos Santos")
            .with_email("maria.santos@x.com")
            .with_branch("Centro")
            .with_state("SP"),
        SellerRecord::new("João Pereira")
            .with_email("joao_pereira@x.com")
            .with_branch("Centro")
            .with_state("SP"),
        SellerRecord::new("Ana Lúcia Ramos")
            .with_email("ana-ramos@x.com")
            .with_branch("Norte")
            .with_state("RJ"),
        SellerRecord::new("Carlos Souza")
            .with_email("carlos@x.com")
            .with_branch("Norte")
            .with_state("RJ"),
        SellerRecord::new("Beatriz Conceição")
            .with_branch("Sul")
            .with_state("PR"),
    ]
}

/// Owner spellings as they appear in raw events for [`five_seller_roster`]
pub fn five_seller_owner_spellings() -> [&'static str; 5] {
    [
        "maria.santos",
        "JOAO PEREIRA",
        "ana-ramos@x.com",
        "Carlos  Souza",
        "beatriz conceicao",
    ]
}

/// Event on `day` of `period`, owned by `owner`
pub fn event_on(period: Period, day: u32, owner: &str) -> ContactEvent {
    ContactEvent::new(format!("{}-{day:02}", period)).with_user(owner)
}

/// Deterministic mixed workload
///
/// Cycles through the five roster spellings plus [`UNRESOLVABLE_OWNER`] and
/// spreads events over every day of `period`. Every `malformed_every`-th
/// event (when non-zero) gets an unparseable date. Returns the events and
/// the number of malformed ones.
pub fn mixed_events(
    period: Period,
    count: usize,
    malformed_every: usize,
) -> (Vec<ContactEvent>, usize) {
    let spellings = five_seller_owner_spellings();
    let days = period.days_in_month();
    let mut malformed = 0;
    let events = (0..count)
        .map(|i| {
            let owner = if i % 6 == 5 {
                UNRESOLVABLE_OWNER
            } else {
                spellings[i % 6]
            };
            if malformed_every > 0 && i % malformed_every == 0 {
                malformed += 1;
                return ContactEvent::new("2026/10/1").with_user(owner);
            }
            let day = u32::try_from(i % days + 1).unwrap_or(1);
            event_on(period, day, owner)
        })
        .collect();
    (events, malformed)
}

/// Straight-line recount, used as an oracle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceTally {
    /// One entry per roster row, day-indexed with index 0 unused
    pub rows: Vec<(String, Vec<u64>)>,
    pub daily: Vec<u64>,
    pub grand: u64,
    /// Counted "Ativo" contacts
    pub active: u64,
    /// Counted "Receptivo" contacts
    pub receptive: u64,
}

impl ReferenceTally {
    pub fn row_total(&self, name: &str) -> Option<u64> {
        self.rows
            .iter()
            .find(|(row, _)| row == name)
            .map(|(_, days)| days.iter().sum())
    }

    pub fn attributed(&self) -> u64 {
        self.rows.iter().flat_map(|(_, days)| days.iter()).sum()
    }
}

/// Count `events` one by one, with no slicing and no memo
pub fn reference_tally(
    period: Period,
    filters: &ContactFilters,
    roster: &[SellerRecord],
    events: &[ContactEvent],
) -> ReferenceTally {
    let index = SellerIndex::build(roster);
    let matcher = filters.matcher();
    let slots = period.slot_count();
    let mut rows: Vec<(String, Vec<u64>)> = index
        .names()
        .iter()
        .map(|name| (name.to_string(), vec![0; slots]))
        .collect();
    let mut daily = vec![0; slots];
    let (mut active, mut receptive) = (0, 0);

    for event in events {
        if !matcher.matches(event) {
            continue;
        }
        let Some(day) = period.day_index(event) else {
            continue;
        };
        if let Some(pos) = index.resolve(event).and_then(|name| index.row_of(&name)) {
            rows[pos].1[day] += 1;
        }
        daily[day] += 1;
        match event.contact_type.as_deref().map(str::to_lowercase).as_deref() {
            Some("ativo") => active += 1,
            Some("receptivo") => receptive += 1,
            _ => {}
        }
    }

    let grand = daily.iter().sum();
    ReferenceTally {
        rows,
        daily,
        grand,
        active,
        receptive,
    }
}

/// Install a test-writer subscriber once per test binary
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}
