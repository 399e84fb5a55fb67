//! `leadcal` command-line front end

mod report;

use anyhow::{bail, Context, Result};
use chrono::{Datelike, Local};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use leadcal_core::{
    generate, CalendarEngine, EngineConfig, InMemorySource, SyncOutcome, SyntheticSpec,
};
use leadcal_engine::CalendarComputed;
use leadcal_model::{ContactFilters, Period};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    let period_args = [
        Arg::new("year")
            .long("year")
            .value_parser(value_parser!(i32))
            .help("Year of the month to aggregate (default: current)"),
        Arg::new("month")
            .long("month")
            .value_parser(value_parser!(u32))
            .help("Month to aggregate, 1-12 (default: current)"),
        Arg::new("config")
            .long("config")
            .value_parser(value_parser!(PathBuf))
            .help("TOML engine configuration"),
    ];

    Command::new("leadcal")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Seller-by-day lead calendar")
        .subcommand_required(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::Count)
                .help("Raise log verbosity (-v debug, -vv trace)"),
        )
        .subcommand(
            Command::new("simulate")
                .about("Aggregate a synthetic month and verify the matrix invariants")
                .arg(
                    Arg::new("events")
                        .long("events")
                        .default_value("10000")
                        .value_parser(value_parser!(usize))
                        .help("Number of synthetic contacts"),
                )
                .arg(
                    Arg::new("sellers")
                        .long("sellers")
                        .default_value("5")
                        .value_parser(value_parser!(usize))
                        .help("Roster size"),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .default_value("42")
                        .value_parser(value_parser!(u64))
                        .help("Random seed for reproducibility"),
                )
                .arg(
                    Arg::new("unresolvable")
                        .long("unresolvable")
                        .default_value("0.05")
                        .value_parser(ratio)
                        .help("Share of contacts owned by no roster seller"),
                )
                .arg(
                    Arg::new("malformed")
                        .long("malformed")
                        .default_value("0.01")
                        .value_parser(ratio)
                        .help("Share of contacts with a broken date"),
                )
                .arg(
                    Arg::new("grid")
                        .long("grid")
                        .action(ArgAction::SetTrue)
                        .help("Print the full grid"),
                )
                .args(period_args.clone()),
        )
        .subcommand(
            Command::new("render")
                .about("Aggregate roster and contacts JSON files and print the grid")
                .arg(
                    Arg::new("roster")
                        .long("roster")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("JSON array of sellers (nomecompleto, email, filial, estado)"),
                )
                .arg(
                    Arg::new("events")
                        .long("events")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("JSON array of contacts (data_dia, usuario, tipo_contato, ...)"),
                )
                .arg(Arg::new("branch").long("branch").help("Branch (filial) filter"))
                .arg(Arg::new("state").long("state").help("State (estado) filter"))
                .arg(Arg::new("status").long("status").help("Contact type filter"))
                .arg(Arg::new("origin").long("origin").help("Origin filter, 'todos' for all"))
                .args(period_args),
        )
}

/// Share in `[0, 1]`
fn ratio(raw: &str) -> Result<f64, String> {
    let value: f64 = raw.parse().map_err(|e| format!("{e}"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{raw} is not a share between 0 and 1"))
    }
}

fn init_tracing(verbosity: u8) {
    let fallback = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = if verbosity == 0 {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
    } else {
        EnvFilter::new(fallback)
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn period_arg(args: &ArgMatches) -> Result<Period> {
    let today = Local::now().date_naive();
    let year = args.get_one::<i32>("year").copied().unwrap_or(today.year());
    let month = args.get_one::<u32>("month").copied().unwrap_or(today.month());
    Period::new(year, month).with_context(|| format!("invalid period {year}-{month}"))
}

fn config_arg(args: &ArgMatches) -> Result<EngineConfig> {
    match args.get_one::<PathBuf>("config") {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

fn required<T: Clone + Send + Sync + 'static>(args: &ArgMatches, name: &str) -> Result<T> {
    args.get_one::<T>(name)
        .cloned()
        .with_context(|| format!("missing --{name}"))
}

async fn published(engine: &CalendarEngine) -> Result<Arc<CalendarComputed>> {
    let started = Instant::now();
    let outcome = engine.sync().await.context("aggregation failed")?;
    let SyncOutcome::Recomputed(snapshot) = outcome else {
        bail!("first sync did not publish a snapshot");
    };
    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    tracing::info!(elapsed_ms, "snapshot ready");
    Ok(snapshot)
}

async fn simulate(args: &ArgMatches) -> Result<()> {
    let period = period_arg(args)?;
    let config = config_arg(args)?;
    let spec = SyntheticSpec::new(
        period,
        required(args, "events")?,
        required(args, "sellers")?,
    )
    .with_seed(required(args, "seed")?)
    .with_unresolvable_ratio(required(args, "unresolvable")?)
    .with_malformed_ratio(required(args, "malformed")?);

    let data = generate(&spec);
    println!(
        "Simulating {} contacts over {} sellers for {period} (seed {})",
        data.events.len(),
        data.roster.len(),
        spec.seed
    );
    println!(
        "  malformed dates: {}, unresolvable owner: {}",
        data.malformed, data.unresolvable
    );

    let countable = u64::try_from(data.countable()).unwrap_or(u64::MAX);
    let source = Arc::new(InMemorySource::new(data.roster, data.events));
    let engine = CalendarEngine::new(config, source);
    engine.set_period(period);
    let snapshot = published(&engine).await?;

    println!("{}", report::summary(&snapshot));
    println!("{}", report::statistics(&snapshot));
    if args.get_flag("grid") {
        print!("{}", report::grid(&snapshot));
    }

    let found = report::violations(&snapshot, Some(countable));
    if !found.is_empty() {
        for violation in &found {
            eprintln!("  violation: {violation}");
        }
        bail!("{} invariant violation(s)", found.len());
    }
    println!("invariants: OK");
    Ok(())
}

async fn render(args: &ArgMatches) -> Result<()> {
    let period = period_arg(args)?;
    let config = config_arg(args)?;
    let roster: PathBuf = required(args, "roster")?;
    let events: PathBuf = required(args, "events")?;
    let source = InMemorySource::from_json_files(&roster, &events)
        .with_context(|| format!("loading {} and {}", roster.display(), events.display()))?;

    let mut filters = ContactFilters::new();
    if let Some(branch) = args.get_one::<String>("branch") {
        filters = filters.with_branch(branch.as_str());
    }
    if let Some(state) = args.get_one::<String>("state") {
        filters = filters.with_state(state.as_str());
    }
    if let Some(status) = args.get_one::<String>("status") {
        filters = filters.with_status(status.as_str());
    }
    if let Some(origin) = args.get_one::<String>("origin") {
        filters = filters.with_origin(origin.as_str());
    }

    let engine = CalendarEngine::new(config, Arc::new(source));
    engine.set_period(period);
    engine.set_filters(filters);
    let snapshot = published(&engine).await?;

    print!("{}", report::grid(&snapshot));
    println!("{}", report::summary(&snapshot));
    println!("{}", report::statistics(&snapshot));
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_count("verbose"));

    match matches.subcommand() {
        Some(("simulate", args)) => simulate(args).await,
        Some(("render", args)) => render(args).await,
        _ => unreachable!("subcommand_required"),
    }
}
