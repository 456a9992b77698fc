#![deny(warnings)]

//! Weekly tick runtime for Hit Tycoon.
//!
//! A [`Simulation`] owns the committed [`GameState`] and a `bevy_ecs` world
//! holding the weekly system chain. Each tick copies the committed state into
//! a [`resources::StagedState`] resource, runs the schedule against it and
//! only commits the copy once every system has finished and the result
//! validates. Player actions run between ticks on the committed state.

pub mod actions;
pub mod report;
pub mod resources;
pub mod starter;
pub mod systems;

use bevy_ecs::prelude::*;
use bevy_ecs::schedule::ExecutorKind;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sim_core::{
    seeded_rng, validate_state, AlbumId, GameState, ProductionTier, PromoStrategy, RegionId,
    SimConfig, SimRng, SongId, ValidationError, VideoId, WorldConstants,
};
use thiserror::Error;
use tracing::{debug, info};

pub use actions::{AlbumDraft, SongDraft, VideoDraft};
pub use report::WeekReport;
pub use resources::week_seed;
pub use starter::new_career;

use resources::{Constants, Settings, StagedState, WeekLedger, WeekRng};

/// Errors surfaced by ticks and player actions.
#[derive(Debug, Error, PartialEq)]
pub enum SimError {
    #[error("insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: Decimal, available: Decimal },
    #[error("unknown song {0}")]
    UnknownSong(String),
    #[error("unknown region {0}")]
    UnknownRegion(String),
    #[error("an album needs at least one track")]
    EmptyAlbum,
    #[error("quality {0} is outside the allowed range")]
    InvalidQuality(u8),
    #[error("no production tier configured for {0:?}")]
    UnknownTier(ProductionTier),
    #[error("song {0} is not a player single")]
    NotPromotable(String),
    #[error("state failed validation: {0}")]
    Invalid(#[from] ValidationError),
    #[error("resource {0} missing after the weekly schedule")]
    MissingResource(&'static str),
}

/// Build the weekly pipeline. Systems run strictly in this order on one
/// thread.
pub fn build_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.set_executor_kind(ExecutorKind::SingleThreaded);
    schedule.add_systems(
        (
            systems::npc_releases,
            systems::simulate_songs,
            systems::aggregate_albums,
            systems::simulate_videos,
            systems::update_listeners,
            systems::update_hype,
            systems::grow_regions,
            systems::drift_trends,
            systems::rebuild_charts,
            systems::advance_clock,
        )
            .chain(),
    );
    schedule
}

/// A running career.
pub struct Simulation {
    world: World,
    schedule: Schedule,
    state: GameState,
    constants: WorldConstants,
    config: SimConfig,
    action_rng: SimRng,
}

impl Simulation {
    /// Wrap a validated state.
    pub fn new(
        state: GameState,
        constants: WorldConstants,
        config: SimConfig,
    ) -> Result<Self, SimError> {
        validate_state(&state)?;
        let mut world = World::new();
        world.insert_resource(Constants(constants.clone()));
        world.insert_resource(Settings(config.clone()));
        // Offset from the tick streams so actions never replay a week's draws.
        let action_rng = seeded_rng(config.rng_seed.rotate_left(17) ^ 0xA5A5_A5A5);
        Ok(Self {
            world,
            schedule: build_schedule(),
            state,
            constants,
            config,
            action_rng,
        })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn constants(&self) -> &WorldConstants {
        &self.constants
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn into_state(self) -> GameState {
        self.state
    }

    /// Simulate one week. On error the committed state is left untouched.
    pub fn tick(&mut self) -> Result<WeekReport, SimError> {
        let clock = self.state.clock.clone();
        let week = clock.absolute_week();

        self.world.insert_resource(StagedState(self.state.clone()));
        self.world.insert_resource(WeekLedger::default());
        self.world
            .insert_resource(WeekRng(seeded_rng(week_seed(self.config.rng_seed, week))));

        self.schedule.run(&mut self.world);

        self.world.remove_resource::<WeekRng>();
        let ledger = self
            .world
            .remove_resource::<WeekLedger>()
            .ok_or(SimError::MissingResource("WeekLedger"))?;
        let staged = self
            .world
            .remove_resource::<StagedState>()
            .ok_or(SimError::MissingResource("StagedState"))?;
        validate_state(&staged.0)?;

        self.state = staged.0;
        let report = WeekReport::from_ledger(&clock, &ledger, &self.state);
        info!(
            week,
            streams = report.player_streams,
            net = %report.net_income(),
            money = %report.money,
            listeners = report.monthly_listeners,
            "week simulated"
        );
        Ok(report)
    }

    /// Run exactly `weeks` ticks in order, one report per week.
    pub fn run_weeks(&mut self, weeks: u32) -> Result<Vec<WeekReport>, SimError> {
        let mut reports = Vec::with_capacity(weeks as usize);
        for _ in 0..weeks {
            reports.push(self.tick()?);
        }
        Ok(reports)
    }

    /// Simulate the weeks that elapsed in wall-clock time since `last_seen`,
    /// capped by the config.
    pub fn catch_up_to(
        &mut self,
        last_seen: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Vec<WeekReport>, SimError> {
        let weeks = sim_core::clock::elapsed_game_weeks(
            last_seen,
            now,
            self.config.real_seconds_per_week,
            self.config.max_catch_up_weeks,
        );
        debug!(weeks, "catching up");
        self.run_weeks(weeks)
    }

    pub fn release_single(&mut self, draft: &SongDraft) -> Result<SongId, SimError> {
        actions::release_single(&mut self.state, &self.constants, draft, &mut self.action_rng)
    }

    pub fn release_album(&mut self, draft: &AlbumDraft) -> Result<AlbumId, SimError> {
        actions::release_album(&mut self.state, &self.constants, draft, &mut self.action_rng)
    }

    pub fn upload_video(&mut self, draft: &VideoDraft) -> Result<VideoId, SimError> {
        actions::upload_video(&mut self.state, draft, &mut self.action_rng)
    }

    pub fn set_promo(&mut self, song: &SongId, strategy: PromoStrategy) -> Result<(), SimError> {
        actions::set_promo(&mut self.state, song, strategy)
    }

    pub fn run_region_campaign(&mut self, region: &RegionId) -> Result<f64, SimError> {
        actions::run_region_campaign(&mut self.state, region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_core::{ChartKey, GenreId, SongKind, VideoKind};

    fn sim(seed: u64) -> Simulation {
        let constants = WorldConstants::builtin();
        let state = new_career(&constants, "Me", 30, 2025, seed);
        let config = SimConfig {
            rng_seed: seed,
            ..SimConfig::default()
        };
        Simulation::new(state, constants, config).unwrap()
    }

    fn single(quality: u8) -> SongDraft {
        SongDraft {
            title: "Opening Night".into(),
            genre: GenreId("pop".into()),
            theme: None,
            tier: ProductionTier::Studio,
            quality: Some(quality),
        }
    }

    #[test]
    fn tick_advances_one_week() {
        let mut s = sim(1);
        let before = s.state().clock.absolute_week();
        let report = s.tick().unwrap();
        assert_eq!(report.week, before);
        assert_eq!(s.state().clock.absolute_week(), before + 1);
    }

    #[test]
    fn released_single_earns_in_its_launch_week() {
        let mut s = sim(2);
        let id = s.release_single(&single(80)).unwrap();
        let report = s.tick().unwrap();
        let song = s.state().song(&id).unwrap();
        assert!(song.weekly_streams > 0);
        assert_eq!(song.total_streams, song.weekly_streams);
        assert_eq!(report.player_streams, song.weekly_streams);
        assert!(report.streaming_revenue > Decimal::ZERO);
    }

    #[test]
    fn charts_are_built_every_week() {
        let mut s = sim(3);
        s.run_weeks(6).unwrap();
        let hot = s.state().chart(&ChartKey::Hot100);
        assert!(!hot.is_empty() && hot.len() <= 100);
        assert_eq!(s.state().chart(&ChartKey::GlobalAlbums).len(), 200);
        assert!(s.state().songs.iter().any(|song| song.has_charted));
    }

    #[test]
    fn unaffordable_promo_lapses_without_debt() {
        let mut s = sim(4);
        let id = s.release_single(&single(70)).unwrap();
        s.set_promo(&id, PromoStrategy::ViralMarketing).unwrap();
        // 50k start - 25k production leaves 25k: one 20k week, then lapse.
        let reports = s.run_weeks(3).unwrap();
        assert_eq!(reports[0].promo_spend, Decimal::new(20_000, 0));
        assert!(reports.iter().any(|r| r.lapsed_promos == 1));
        assert_eq!(s.state().song(&id).unwrap().promo, PromoStrategy::None);
        assert!(s.state().player.money >= Decimal::ZERO);
    }

    #[test]
    fn actions_are_rejected_cleanly() {
        let mut s = sim(5);
        let album = AlbumDraft {
            title: "Too Big".into(),
            theme: None,
            tracks: vec![single(70); 3],
        };
        assert!(matches!(
            s.release_album(&album),
            Err(SimError::InsufficientFunds { .. })
        ));
        assert!(s.state().albums.is_empty());
        let video = VideoDraft {
            title: "Vlog".into(),
            song_id: None,
            kind: VideoKind::Shorts,
            production_quality: 40,
            concept_quality: 40,
            thumbnail_quality: 40,
        };
        s.upload_video(&video).unwrap();
        s.run_weeks(2).unwrap();
        assert!(s.state().videos[0].total_views > 0);
    }

    #[test]
    fn album_tracks_are_simulated_as_tracks() {
        let mut s = sim(6);
        let album = AlbumDraft {
            title: "EP".into(),
            theme: None,
            tracks: vec![SongDraft {
                tier: ProductionTier::Demo,
                quality: Some(40),
                ..single(40)
            }],
        };
        let id = s.release_album(&album).unwrap();
        s.tick().unwrap();
        let a = s.state().album(&id).unwrap();
        let track = s.state().song(&a.track_ids[0]).unwrap();
        assert_eq!(track.kind, SongKind::Track);
        assert_eq!(a.weekly_sales, track.weekly_sales);
    }
}
