#![deny(warnings)]

//! Headless runner: builds or resumes a career, simulates a number of weeks
//! and prints the resulting KPIs and chart tops.

use anyhow::{Context, Result};
use chrono::Utc;
use persistence::SaveSlot;
use rust_decimal::Decimal;
use sim_core::{ChartKey, GenreId, ProductionTier, SimConfig, WorldConstants};
use sim_runtime::{new_career, Simulation, SongDraft, WeekReport};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const START_YEAR: i32 = 2025;

struct Args {
    weeks: u32,
    /// Seed for a new career; a resumed save keeps its own.
    seed: Option<u64>,
    npcs: usize,
    name: String,
    config: Option<PathBuf>,
    save: Option<PathBuf>,
    json: bool,
    top: usize,
}

fn parse_args() -> Args {
    let mut args = Args {
        weeks: 12,
        seed: None,
        npcs: 60,
        name: "You".to_string(),
        config: None,
        save: None,
        json: false,
        top: 10,
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--weeks" => args.weeks = it.next().and_then(|s| s.parse().ok()).unwrap_or(args.weeks),
            "--seed" => args.seed = it.next().and_then(|s| s.parse().ok()),
            "--npcs" => args.npcs = it.next().and_then(|s| s.parse().ok()).unwrap_or(args.npcs),
            "--top" => args.top = it.next().and_then(|s| s.parse().ok()).unwrap_or(args.top),
            "--name" => args.name = it.next().unwrap_or(args.name),
            "--config" => args.config = it.next().map(PathBuf::from),
            "--save" => args.save = it.next().map(PathBuf::from),
            "--json" => args.json = true,
            other => warn!(arg = other, "ignoring unknown argument"),
        }
    }
    args
}

fn debut_single() -> SongDraft {
    SongDraft {
        title: "Debut".to_string(),
        genre: GenreId("pop".to_string()),
        theme: None,
        tier: ProductionTier::Indie,
        quality: None,
    }
}

fn print_summary(sim: &Simulation, reports: &[WeekReport], top: usize) {
    let state = sim.state();
    let streams: u64 = reports.iter().map(|r| r.player_streams).sum();
    let views: u64 = reports.iter().map(|r| r.video_views).sum();
    let net: Decimal = reports.iter().map(WeekReport::net_income).sum();
    let best = reports.iter().filter_map(|r| r.player_best_hot100).min();

    println!(
        "Week {} of {}-{:02} | songs: {} | albums: {} | npcs: {}",
        state.clock.week,
        state.clock.year,
        state.clock.month,
        state.songs.len(),
        state.albums.len(),
        state.npcs.len()
    );
    println!(
        "KPI | weeks: {} | streams: {} | views: {} | net: ${} | cash: ${} | hype: {:.1} | listeners: {} | best HOT_100: {}",
        reports.len(),
        streams,
        views,
        net.round_dp(2),
        state.player.money.round_dp(2),
        state.player.hype,
        state.player.monthly_listeners,
        best.map_or_else(|| "-".to_string(), |r| format!("#{r}"))
    );

    println!("{}", ChartKey::Hot100);
    for entry in state.chart(&ChartKey::Hot100).iter().take(top) {
        let marker = if entry.is_player { "*" } else { " " };
        let last = entry
            .previous_rank
            .map_or_else(|| "--".to_string(), |r| r.to_string());
        println!(
            "{marker}{:>3} ({:>3}) {:<28} {:<20} {:>10} streams  wks {:>2}  peak {}",
            entry.rank,
            last,
            entry.title,
            entry.artist,
            entry.metric_primary,
            entry.weeks_on_chart,
            entry.peak_rank
        );
    }
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = parse_args();
    info!(
        git_sha = env!("GIT_SHA"),
        built = env!("BUILD_DATE"),
        weeks = args.weeks,
        seed = ?args.seed,
        "starting hit-tycoon"
    );

    let constants = match &args.config {
        Some(path) => WorldConstants::from_file(path)?,
        None => WorldConstants::builtin(),
    };
    let slot = args.save.as_ref().map(SaveSlot::new);
    let saved = match &slot {
        Some(slot) => slot.load()?,
        None => None,
    };

    let (mut sim, version) = match saved {
        Some(snapshot) => {
            let config = snapshot.config;
            if args.seed.is_some_and(|seed| seed != config.rng_seed) {
                warn!(saved = config.rng_seed, "--seed ignored: resuming with the saved seed");
            }
            let mut sim = Simulation::new(snapshot.state, constants, config)
                .context("saved career failed to load")?;
            let caught_up = sim.catch_up_to(snapshot.saved_at, Utc::now())?;
            info!(weeks = caught_up.len(), "caught up since last save");
            (sim, Some(snapshot.version))
        }
        None => {
            let config = SimConfig {
                rng_seed: args.seed.unwrap_or(SimConfig::default().rng_seed),
                ..SimConfig::default()
            };
            let state = new_career(&constants, &args.name, args.npcs, START_YEAR, config.rng_seed);
            let mut sim = Simulation::new(state, constants, config)?;
            let song = sim.release_single(&debut_single())?;
            info!(song = %song.0, "debut single released");
            (sim, None)
        }
    };

    let reports = sim.run_weeks(args.weeks)?;
    if args.json {
        for report in &reports {
            println!("{}", serde_json::to_string(report)?);
        }
    }
    print_summary(&sim, &reports, args.top);

    if let Some(slot) = slot {
        let version = slot
            .save(sim.state(), sim.config(), version, Utc::now())
            .with_context(|| format!("saving to {}", slot.path().display()))?;
        println!("Saved {} (version {version})", slot.path().display());
    }
    Ok(())
}
