//! Text output for snapshots

use leadcal_engine::CalendarComputed;
use std::fmt::Write as _;

const NAME_WIDTH: usize = 24;
const UNATTRIBUTED: &str = "(sem vendedor)";

/// Seller-by-day grid with an unattributed row and a totals row
pub(crate) fn grid(snapshot: &CalendarComputed) -> String {
    let days = snapshot.days_in_month();
    let mut out = String::new();

    let _ = write!(out, "{:<NAME_WIDTH$}", snapshot.period().to_string());
    for day in 1..=days {
        let _ = write!(out, " {day:>3}");
    }
    let _ = writeln!(out, " {:>7}", "Total");

    for row in snapshot.sellers() {
        let _ = write!(out, "{:<NAME_WIDTH$}", truncate(row.id()));
        for day in 1..=days {
            let _ = write!(out, " {:>3}", cell(u64::from(row.count(day))));
        }
        let _ = writeln!(out, " {:>7}", row.total());
    }

    if snapshot.anonymous_total() > 0 {
        let _ = write!(out, "{UNATTRIBUTED:<NAME_WIDTH$}");
        for day in 1..=days {
            let _ = write!(out, " {:>3}", cell(snapshot.anonymous_on(day)));
        }
        let _ = writeln!(out, " {:>7}", snapshot.anonymous_total());
    }

    let _ = write!(out, "{:<NAME_WIDTH$}", "Total");
    for day in 1..=days {
        let _ = write!(out, " {:>3}", snapshot.day_total(day));
    }
    let _ = writeln!(out, " {:>7}", snapshot.grand_total());
    out
}

/// One-paragraph summary
pub(crate) fn summary(snapshot: &CalendarComputed) -> String {
    let busiest = (1..=snapshot.days_in_month())
        .max_by_key(|&day| (snapshot.day_total(day), std::cmp::Reverse(day)))
        .unwrap_or(1);
    format!(
        "period {}: {} sellers, {} leads ({} attributed, {} unattributed), busiest day {:02} with {}",
        snapshot.period(),
        snapshot.sellers().len(),
        snapshot.grand_total(),
        snapshot.attributed_total(),
        snapshot.anonymous_total(),
        busiest,
        snapshot.day_total(busiest),
    )
}

/// Contact-type badges: active, receptive and total
pub(crate) fn statistics(snapshot: &CalendarComputed) -> String {
    let stats = snapshot.statistics();
    format!(
        "Ativos: {}  Receptivos: {}  Total: {}",
        stats.active, stats.receptive, stats.total
    )
}

/// Broken matrix invariants, empty when the snapshot reconciles
pub(crate) fn violations(snapshot: &CalendarComputed, expected_total: Option<u64>) -> Vec<String> {
    let mut found = Vec::new();
    for day in 1..=snapshot.days_in_month() {
        let rows: u64 = snapshot.sellers().iter().map(|r| u64::from(r.count(day))).sum();
        if rows > snapshot.day_total(day) {
            found.push(format!(
                "day {day}: rows sum to {rows} but day total is {}",
                snapshot.day_total(day)
            ));
        }
    }
    let days: u64 = snapshot.daily_totals().iter().skip(1).sum();
    if days != snapshot.grand_total() {
        found.push(format!(
            "grand total {} differs from daily sum {days}",
            snapshot.grand_total()
        ));
    }
    for row in snapshot.sellers() {
        let sum: u64 = row.leads().iter().skip(1).map(|c| u64::from(*c)).sum();
        if sum != row.total() {
            found.push(format!("{}: total {} but days sum to {sum}", row.id(), row.total()));
        }
    }
    if let Some(expected) = expected_total {
        let counted = snapshot.attributed_total() + snapshot.anonymous_total();
        if counted != expected {
            found.push(format!("counted {counted} leads, expected {expected}"));
        }
    }
    found
}

fn cell(count: u64) -> String {
    if count == 0 {
        ".".to_string()
    } else {
        count.to_string()
    }
}

fn truncate(name: &str) -> String {
    if name.chars().count() <= NAME_WIDTH - 1 {
        name.to_string()
    } else {
        let mut short: String = name.chars().take(NAME_WIDTH - 2).collect();
        short.push('~');
        short
    }
}
