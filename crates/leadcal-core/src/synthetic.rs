//! Deterministic synthetic workloads
//!
//! Generates a roster and a month of contacts with the owner spellings seen
//! in practice: display names in odd casing, names without accents, e-mail
//! logins and full addresses. A share of the contacts is owned by an
//! integration account that matches no seller, and a share carries a broken
//! date.

use leadcal_identity::normalize_name;
use leadcal_model::{ContactEvent, ContactId, Period, SellerRecord, ORIGIN_OPTIONS};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Owner identifier that resolves to no seller
pub const UNRESOLVABLE_OWNER: &str = "integracao.api";

const FIRST_NAMES: &[&str] = &[
    "Maria", "João", "Ana", "Carlos", "Beatriz", "José", "Fernanda", "Lúcia", "Rafael", "Conceição",
];
const LAST_NAMES: &[&str] = &[
    "Santos", "Pereira", "Souza", "Lima", "Araújo", "Gonçalves", "Ribeiro", "Simões",
];
const BRANCHES: &[(&str, &str)] = &[("Centro", "SP"), ("Norte", "RJ"), ("Sul", "PR")];

/// Shape of a synthetic workload
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticSpec {
    pub period: Period,
    pub events: usize,
    pub sellers: usize,
    pub seed: u64,
    /// Share of contacts owned by [`UNRESOLVABLE_OWNER`]
    pub unresolvable_ratio: f64,
    /// Share of contacts with a malformed date
    pub malformed_ratio: f64,
}

impl SyntheticSpec {
    #[must_use]
    pub fn new(period: Period, events: usize, sellers: usize) -> Self {
        Self {
            period,
            events,
            sellers,
            seed: 0,
            unresolvable_ratio: 0.05,
            malformed_ratio: 0.01,
        }
    }

    /// With RNG seed
    #[inline]
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// With unresolvable-owner share, clamped to `[0, 1]`; NaN means none
    #[inline]
    #[must_use]
    pub fn with_unresolvable_ratio(mut self, ratio: f64) -> Self {
        self.unresolvable_ratio = probability(ratio);
        self
    }

    /// With malformed-date share, clamped to `[0, 1]`; NaN means none
    #[inline]
    #[must_use]
    pub fn with_malformed_ratio(mut self, ratio: f64) -> Self {
        self.malformed_ratio = probability(ratio);
        self
    }
}

fn probability(ratio: f64) -> f64 {
    if ratio.is_nan() {
        0.0
    } else {
        ratio.clamp(0.0, 1.0)
    }
}

/// Generated roster and contacts with the counts needed to check a pass
#[derive(Debug, Clone)]
pub struct SyntheticData {
    pub roster: Vec<SellerRecord>,
    pub events: Vec<ContactEvent>,
    /// Contacts with a malformed date
    pub malformed: usize,
    /// Well-dated contacts owned by [`UNRESOLVABLE_OWNER`]
    pub unresolvable: usize,
}

impl SyntheticData {
    /// Contacts expected in the matrix (no filters)
    #[inline]
    #[must_use]
    pub fn countable(&self) -> usize {
        self.events.len() - self.malformed
    }
}

/// Generate a workload; equal [`SyntheticSpec`]s always yield the same data
#[must_use]
pub fn generate(spec: &SyntheticSpec) -> SyntheticData {
    let mut rng = StdRng::seed_from_u64(spec.seed);
    let roster: Vec<SellerRecord> = (0..spec.sellers).map(seller).collect();
    let days = u32::try_from(spec.period.days_in_month()).unwrap_or(28);

    let mut malformed = 0;
    let mut unresolvable = 0;
    let mut events = Vec::with_capacity(spec.events);

    for i in 0..spec.events {
        let broken = rng.gen_bool(probability(spec.malformed_ratio));
        let anonymous = roster.is_empty() || rng.gen_bool(probability(spec.unresolvable_ratio));

        let date = if broken {
            malformed += 1;
            broken_date(&mut rng, spec.period)
        } else {
            format!("{}-{:02}", spec.period, rng.gen_range(1..=days))
        };
        let owner = if anonymous {
            if !broken {
                unresolvable += 1;
            }
            UNRESOLVABLE_OWNER.to_string()
        } else {
            let pick = rng.gen_range(0..roster.len());
            spelling(&mut rng, &roster[pick])
        };

        let mut event = ContactEvent::default()
            .with_id(ContactId::from(i64::try_from(i).unwrap_or(i64::MAX)))
            .with_contact_type(if rng.gen_bool(0.6) { "Ativo" } else { "Receptivo" });
        event = if rng.gen_bool(0.3) {
            let (hour, minute) = (rng.gen_range(8..19), rng.gen_range(0..60));
            event.with_timestamp(format!("{date}T{hour:02}:{minute:02}:00"))
        } else {
            ContactEvent { day: Some(date), ..event }
        };
        event = if rng.gen_bool(0.85) {
            event.with_user(owner)
        } else {
            event.with_seller(owner)
        };
        if rng.gen_bool(0.9) {
            let origin = ORIGIN_OPTIONS[rng.gen_range(1..ORIGIN_OPTIONS.len())];
            event = event.with_origin(origin.value);
        }
        events.push(event);
    }

    tracing::debug!(
        events = events.len(),
        sellers = roster.len(),
        malformed,
        unresolvable,
        seed = spec.seed,
        "synthetic workload generated"
    );
    SyntheticData {
        roster,
        events,
        malformed,
        unresolvable,
    }
}

fn seller(i: usize) -> SellerRecord {
    let first = FIRST_NAMES[i % FIRST_NAMES.len()];
    let last = LAST_NAMES[(i / FIRST_NAMES.len()) % LAST_NAMES.len()];
    let round = i / (FIRST_NAMES.len() * LAST_NAMES.len());
    let name = if round == 0 {
        format!("{first} {last}")
    } else {
        format!("{first} {last} {}", round + 1)
    };
    let login = normalize_name(&name).replace(' ', ".");
    let (branch, state) = BRANCHES[i % BRANCHES.len()];
    SellerRecord::new(name)
        .with_email(format!("{login}@leadcal.test"))
        .with_branch(branch)
        .with_state(state)
}

fn spelling(rng: &mut StdRng, seller: &SellerRecord) -> String {
    let email = seller.email.as_deref().unwrap_or(&seller.name);
    match rng.gen_range(0..5) {
        0 => seller.name.clone(),
        1 => seller.name.to_uppercase(),
        2 => normalize_name(&seller.name),
        3 => email.split('@').next().unwrap_or(email).to_string(),
        _ => email.to_string(),
    }
}

fn broken_date(rng: &mut StdRng, period: Period) -> String {
    match rng.gen_range(0..4) {
        0 => format!("{:02}/{:02}/{}", rng.gen_range(1..=28), period.month(), period.year()),
        1 => format!("{period}-{}", rng.gen_range(1..=9)),
        2 => format!("{period}-{}", period.days_in_month() + 1),
        _ => String::new(),
    }
}
