use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use sim_core::{GenreId, ProductionTier, SimConfig, WorldConstants};
use sim_runtime::{new_career, Simulation, SongDraft};

fn simulation(seed: u64) -> Simulation {
    let constants = WorldConstants::builtin();
    let state = new_career(&constants, "Player", 25, 2025, seed);
    let config = SimConfig {
        rng_seed: seed,
        real_seconds_per_week: 300,
        max_catch_up_weeks: 10,
        ..SimConfig::default()
    };
    Simulation::new(state, constants, config).unwrap()
}

fn debut() -> SongDraft {
    SongDraft {
        title: "First Steps".into(),
        genre: GenreId("pop".into()),
        theme: None,
        tier: ProductionTier::Studio,
        quality: Some(75),
    }
}

#[test]
fn catch_up_yields_one_report_per_elapsed_week() {
    let mut sim = simulation(11);
    let song = sim.release_single(&debut()).unwrap();
    let start = sim.state().clock.absolute_week();
    let last_seen = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
    let now = last_seen + Duration::seconds(3 * 300 + 299);

    let reports = sim.catch_up_to(last_seen, now).unwrap();

    let weeks: Vec<u32> = reports.iter().map(|r| r.week).collect();
    assert_eq!(weeks, vec![start, start + 1, start + 2]);
    assert_eq!(sim.state().clock.absolute_week(), start + 3);

    let streams: Vec<u64> = reports.iter().map(|r| r.player_streams).collect();
    assert!(streams.iter().all(|&s| s > 0), "{streams:?}");
    assert_ne!(streams[0], streams[1]);
    assert_ne!(streams[1], streams[2]);
    assert_ne!(streams[0], streams[2]);
    let total = sim.state().song(&song).unwrap().total_streams;
    assert_eq!(streams.iter().sum::<u64>(), total);
}

#[test]
fn catch_up_matches_individual_ticks() {
    let mut caught_up = simulation(21);
    let mut stepped = simulation(21);
    caught_up.release_single(&debut()).unwrap();
    stepped.release_single(&debut()).unwrap();

    let last_seen = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
    let reports = caught_up
        .catch_up_to(last_seen, last_seen + Duration::seconds(3 * 300))
        .unwrap();
    assert_eq!(reports.len(), 3);

    let mut money = Vec::new();
    for report in &reports {
        let tick = stepped.tick().unwrap();
        assert_eq!(&tick, report);
        money.push(stepped.state().player.money);
    }
    let cash: Vec<_> = reports.iter().map(|r| r.money).collect();
    assert_eq!(cash, money);
    assert_eq!(
        serde_json::to_value(caught_up.state()).unwrap(),
        serde_json::to_value(stepped.state()).unwrap()
    );
}

#[test]
fn catch_up_is_capped() {
    let mut sim = simulation(12);
    let last_seen = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    let now = last_seen + Duration::days(30);
    assert_eq!(sim.catch_up_to(last_seen, now).unwrap().len(), 10);
    assert!(sim.catch_up_to(now, last_seen).unwrap().is_empty());
}

#[test]
fn month_and_year_roll_over() {
    let mut sim = simulation(13);
    let reports = sim.run_weeks(49).unwrap();
    assert_eq!(reports[0].month, 1);
    assert_eq!(reports[4].month, 2);
    assert_eq!(reports[48].year, 2026);
    assert_eq!(sim.state().clock.year, 2026);
}

#[test]
fn snapshots_round_trip_mid_career() {
    let mut sim = simulation(14);
    sim.release_single(&SongDraft {
        title: "Echoes".into(),
        genre: GenreId("rnb".into()),
        tier: ProductionTier::Indie,
        quality: Some(60),
        ..debut()
    })
    .unwrap();
    sim.run_weeks(4).unwrap();

    let json = serde_json::to_string(sim.state()).unwrap();
    let restored: sim_core::GameState = serde_json::from_str(&json).unwrap();
    let mut resumed =
        Simulation::new(restored, sim.constants().clone(), sim.config().clone()).unwrap();

    let a = sim.run_weeks(3).unwrap();
    let b = resumed.run_weeks(3).unwrap();
    assert_eq!(a, b);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn same_seed_same_career(seed in 0u64..1_000) {
        let a = simulation(seed).run_weeks(5).unwrap();
        let b = simulation(seed).run_weeks(5).unwrap();
        prop_assert_eq!(a, b);
    }
}
