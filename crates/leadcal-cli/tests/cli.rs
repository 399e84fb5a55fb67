//! Runs the `leadcal` binary end to end

use pretty_assertions::assert_eq;
use std::process::{Command, Output};

fn leadcal(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_leadcal"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to run leadcal")
}

#[test]
fn simulate_reconciles_ten_thousand_contacts() {
    let out = leadcal(&[
        "simulate", "--events", "10000", "--sellers", "5", "--seed", "7", "--year", "2026",
        "--month", "10",
    ]);
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert!(stdout.contains("Simulating 10000 contacts over 5 sellers for 2026-10"));
    assert!(stdout.contains("invariants: OK"));
}

#[test]
fn simulate_prints_grid_on_request() {
    let out = leadcal(&[
        "simulate", "--events", "300", "--sellers", "3", "--year", "2024", "--month", "2",
        "--grid",
    ]);
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(out.status.success());
    let header = stdout.lines().find(|l| l.starts_with("2024-02")).unwrap();
    // Leap year: 29 day columns plus the total column.
    assert_eq!(header.split_whitespace().count(), 1 + 29 + 1);
}

#[test]
fn render_reads_json_files_and_applies_filters() {
    let dir = tempfile::tempdir().unwrap();
    let roster = dir.path().join("roster.json");
    let events = dir.path().join("contatos.json");
    std::fs::write(
        &roster,
        serde_json::json!([
            {"nomecompleto": "Maria Dos Santos", "email": "maria.santos@x.com", "filial": "Centro"},
            {"nomecompleto": "Carlos Souza", "filial": "Norte"}
        ])
        .to_string(),
    )
    .unwrap();
    std::fs::write(
        &events,
        serde_json::json!([
            {"id": 1, "data_dia": "2026-10-01", "usuario": "maria.santos", "tipo_contato": "Ativo"},
            {"id": 2, "data_hora": "2026-10-02T10:00:00", "vendedor": "carlos souza", "tipo_contato": "Ativo"},
            {"id": 3, "data_dia": "2026-10-02", "usuario": "robo", "tipo_contato": "Receptivo"},
            {"id": 4, "data_dia": "02/10/2026", "usuario": "maria.santos", "tipo_contato": "Ativo"}
        ])
        .to_string(),
    )
    .unwrap();

    let roster = roster.to_str().unwrap();
    let events = events.to_str().unwrap();
    let base = ["render", "--roster", roster, "--events", events, "--year", "2026", "--month", "10"];

    let out = leadcal(&base);
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert!(stdout.contains("3 leads (2 attributed, 1 unattributed)"));
    assert!(stdout.contains("Ativos: 2  Receptivos: 1  Total: 3"));

    let mut filtered = base.to_vec();
    filtered.extend(["--status", "ativo", "--branch", "Centro"]);
    let out = leadcal(&filtered);
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(out.status.success());
    assert!(stdout.contains("1 sellers, 2 leads (1 attributed, 1 unattributed)"));
}

#[test]
fn render_reports_missing_files() {
    let out = leadcal(&[
        "render", "--roster", "/nonexistent/roster.json", "--events", "/nonexistent/c.json",
    ]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("cannot read"));
}

#[test]
fn non_finite_ratio_is_rejected() {
    for bad in ["NaN", "inf", "1.5"] {
        let out = leadcal(&["simulate", "--events", "10", "--malformed", bad]);
        assert!(!out.status.success(), "accepted --malformed {bad}");
        assert!(String::from_utf8_lossy(&out.stderr).contains("--malformed"));
    }
}

#[test]
fn invalid_month_is_rejected() {
    let out = leadcal(&["simulate", "--events", "10", "--year", "2026", "--month", "13"]);
    assert!(!out.status.success());
}
