//! Genre-trend and seasonal-theme multipliers, plus weekly trend drift.

use rand::Rng;
use sim_core::{GenreId, GenreProfile, Song};
use std::collections::{BTreeMap, BTreeSet};

use crate::profile::kind_profile;

/// Boost for a song whose theme is in season.
pub const SEASONAL_THEME_BOOST: f64 = 1.3;
/// Genre trends stay inside this band.
pub const TREND_MIN: f64 = 0.5;
pub const TREND_MAX: f64 = 2.0;
/// Weekly pull back towards a neutral 1.0.
pub const TREND_REVERSION: f64 = 0.1;
/// Half-width of the weekly random walk.
pub const TREND_NOISE: f64 = 0.05;
/// Bump for the genre currently leading the Hot 100.
pub const CHART_LEADER_BUMP: f64 = 0.03;

/// Current trend for a genre; genres without an entry are neutral.
pub fn genre_trend(genre_trends: &BTreeMap<GenreId, f64>, genre: &GenreId) -> f64 {
    genre_trends.get(genre).copied().unwrap_or(1.0)
}

/// Trend multiplier for one song this week.
///
/// Singles ride the full genre trend; catalog tracks only see 10% of the
/// swing away from 1.0.
pub fn compute_trend(
    song: &Song,
    genre_trends: &BTreeMap<GenreId, f64>,
    active_themes: &BTreeSet<&str>,
) -> f64 {
    let trend = genre_trend(genre_trends, &song.genre);
    let passthrough = kind_profile(song.kind).trend_passthrough;
    let mut multiplier = 1.0 + passthrough * (trend - 1.0);
    if let Some(theme) = song.theme.as_deref() {
        if active_themes.contains(theme) {
            multiplier *= SEASONAL_THEME_BOOST;
        }
    }
    multiplier
}

/// Advance every genre trend by one week.
///
/// Genres listed in `genres` but missing from `trends` start at 1.0. The
/// chart leader's genre gets a small push, so hits pull their genre upward.
pub fn drift_genre_trends<R: Rng + ?Sized>(
    trends: &mut BTreeMap<GenreId, f64>,
    genres: &[GenreProfile],
    chart_leader: Option<&GenreId>,
    rng: &mut R,
) {
    for g in genres {
        trends.entry(g.id.clone()).or_insert(1.0);
    }
    for (genre, trend) in trends.iter_mut() {
        let noise = rng.gen_range(-TREND_NOISE..TREND_NOISE);
        let mut next = *trend + TREND_REVERSION * (1.0 - *trend) + noise;
        if chart_leader == Some(genre) {
            next += CHART_LEADER_BUMP;
        }
        *trend = next.clamp(TREND_MIN, TREND_MAX);
    }
}
