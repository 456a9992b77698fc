//! Monthly Listeners Estimator.
//!
//! Turns a catalog's weekly streams into a smoothed "monthly listeners"
//! figure. Listeners never fall more than 5% in one call.

use sim_core::{average_popularity, GenreId, NpcArtist, RegionStats, Song};
use std::collections::BTreeMap;

use crate::profile::kind_profile;
use crate::trend::genre_trend;

/// Songs under this many weekly streams are treated as inactive.
pub const ACTIVE_STREAM_THRESHOLD: u64 = 100;
/// Any song above this many weekly streams triggers the viral bonus.
pub const VIRAL_LISTENER_THRESHOLD: u64 = 1_000_000;
pub const VIRAL_LISTENER_BONUS: f64 = 1.4;
pub const LISTENER_SCALE: f64 = 1.6;
/// Weekly retention when nothing is active.
pub const IDLE_DECAY: f64 = 0.98;
/// Listeners never drop below this share of last week's figure.
pub const MAX_WEEKLY_DROP_FLOOR: f64 = 0.95;
pub const HOLIDAY_BUMP: f64 = 1.10;
pub const HALLOWEEN_BUMP: f64 = 1.05;

/// Whose listeners are being estimated.
#[derive(Clone, Copy, Debug)]
pub enum ListenerArtist<'a> {
    Player,
    Npc(&'a NpcArtist),
}

impl ListenerArtist<'_> {
    fn momentum(&self) -> f64 {
        match self {
            ListenerArtist::Player => 0.7,
            ListenerArtist::Npc(_) => 0.85,
        }
    }

    fn catalog_penalty_scale(&self) -> f64 {
        match self {
            ListenerArtist::Player => 1.0,
            ListenerArtist::Npc(_) => 1.2,
        }
    }

    fn region_score(&self, regions: &[RegionStats]) -> f64 {
        match self {
            ListenerArtist::Player => average_popularity(regions),
            ListenerArtist::Npc(npc) => npc.global_popularity,
        }
    }
}

/// Calendar flags that bump listener counts.
#[derive(Clone, Copy, Debug, Default)]
pub struct ListenerSeason {
    pub is_holiday: bool,
    pub is_halloween: bool,
}

/// Share of raw listeners that are distinct people: rises with catalog size.
pub fn dedup_multiplier(active_count: usize) -> f64 {
    (0.85 + 0.015 * active_count as f64).clamp(0.65, 0.98)
}

/// Penalty for spreading a fanbase over many songs.
pub fn catalog_penalty(active_count: usize, scale: f64) -> f64 {
    (1.0 - 0.025 * active_count as f64 * scale).max(0.65)
}

/// Estimate new monthly listeners.
///
/// Example:
/// let listeners = estimate_listeners(0, &[], &[], &BTreeMap::new(),
///     ListenerSeason::default(), ListenerArtist::Player);
/// assert_eq!(listeners, 0);
pub fn estimate_listeners(
    prev_listeners: u64,
    songs: &[&Song],
    regions: &[RegionStats],
    genre_trends: &BTreeMap<GenreId, f64>,
    season: ListenerSeason,
    artist: ListenerArtist<'_>,
) -> u64 {
    let prev = prev_listeners as f64;
    let active: Vec<&Song> = songs
        .iter()
        .copied()
        .filter(|s| s.weekly_streams >= ACTIVE_STREAM_THRESHOLD)
        .collect();

    let raw: f64 = active
        .iter()
        .map(|s| {
            let monthly_streams = s.weekly_streams as f64 * 4.0;
            monthly_streams.sqrt() * LISTENER_SCALE * kind_profile(s.kind).listener_weight
        })
        .sum();
    if raw <= 0.0 {
        return (prev * IDLE_DECAY).floor() as u64;
    }

    let n = active.len();
    let mut unique =
        raw * dedup_multiplier(n) * catalog_penalty(n, artist.catalog_penalty_scale());
    if active
        .iter()
        .any(|s| s.weekly_streams > VIRAL_LISTENER_THRESHOLD)
    {
        unique *= VIRAL_LISTENER_BONUS;
    }

    let mean_trend =
        active.iter().map(|s| genre_trend(genre_trends, &s.genre)).sum::<f64>() / n as f64;
    let region_multiplier = 0.9 + artist.region_score(regions) / 80.0;
    let calculated = unique * region_multiplier * mean_trend.clamp(0.8, 1.2);

    let momentum = artist.momentum();
    let mut next = prev * momentum + calculated * (1.0 - momentum);
    if season.is_holiday {
        next *= HOLIDAY_BUMP;
    }
    if season.is_halloween {
        next *= HALLOWEEN_BUMP;
    }
    next = next.max(prev * MAX_WEEKLY_DROP_FLOOR);
    if !next.is_finite() {
        return prev_listeners;
    }
    next.max(0.0).floor() as u64
}
