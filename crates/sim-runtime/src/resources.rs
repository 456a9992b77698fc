//! ECS resources shared by the weekly systems.

use bevy_ecs::prelude::*;
use rust_decimal::Decimal;
use sim_core::{GameState, RegionId, SimConfig, SimRng, WorldConstants};
use std::collections::BTreeMap;

/// Working copy of the state for the week being simulated. Systems only ever
/// write here; it replaces the committed state once the whole schedule ran.
#[derive(Resource, Debug, Clone)]
pub struct StagedState(pub GameState);

/// Static lookup tables.
#[derive(Resource, Debug, Clone)]
pub struct Constants(pub WorldConstants);

#[derive(Resource, Debug, Clone)]
pub struct Settings(pub SimConfig);

/// Random source for this week, reseeded every tick from the run seed and
/// the absolute week.
#[derive(Resource, Debug)]
pub struct WeekRng(pub SimRng);

/// Per-week accumulators filled in by the systems and turned into a
/// [`crate::WeekReport`] after the schedule finishes.
#[derive(Resource, Debug, Default)]
pub struct WeekLedger {
    pub player_streams: u64,
    pub player_sales: u64,
    pub streaming_revenue: Decimal,
    pub video_revenue: Decimal,
    pub promo_spend: Decimal,
    pub video_views: u64,
    pub hype_gain: f64,
    pub player_regional_streams: BTreeMap<RegionId, u64>,
    pub lapsed_promos: usize,
    pub npc_songs_released: usize,
    pub chart_debuts: usize,
    pub player_best_hot100: Option<u32>,
}

/// Seed for the given absolute week.
pub fn week_seed(run_seed: u64, absolute_week: u32) -> u64 {
    run_seed ^ (absolute_week as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}
