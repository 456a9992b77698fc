//! Age-based multiplier curve with a seasonal override.

use sim_core::{Song, THEME_CHRISTMAS, THEME_HALLOWEEN};

use crate::profile::kind_profile;

/// Last week (inclusive) of the fresh phase.
pub const FRESH_WEEKS: u32 = 4;
/// Last week (inclusive) of the active phase.
pub const ACTIVE_WEEKS: u32 = 20;
/// Legacy multipliers never drop below this.
pub const LEGACY_FLOOR: f64 = 0.01;
/// Ceiling on the weekly legacy retention rate.
pub const MAX_DECAY_RATE: f64 = 0.995;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecyclePhase {
    Seasonal,
    Fresh,
    Active,
    Legacy,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lifecycle {
    pub phase: LifecyclePhase,
    pub multiplier: f64,
    pub hype_impact: f64,
}

/// Seasonal multiplier for themed songs, `None` for everything else.
pub fn seasonal_override(song: &Song, month: u32) -> Option<f64> {
    if song.has_theme(THEME_CHRISTMAS) {
        Some(match month {
            12 => 6.0,
            11 => 2.0,
            _ => 0.01,
        })
    } else if song.has_theme(THEME_HALLOWEEN) {
        Some(if month == 10 { 4.0 } else { 0.02 })
    } else {
        None
    }
}

/// Weekly retention in the legacy phase, capped at [`MAX_DECAY_RATE`].
pub fn legacy_decay_rate(song: &Song, genre_longevity: f64) -> f64 {
    let profile = kind_profile(song.kind);
    let q = song.quality as f64;
    let mut rate = genre_longevity + q / 5000.0 - profile.legacy_decay_penalty;
    if song.quality >= 90 {
        rate += 0.02;
    }
    rate.clamp(0.0, MAX_DECAY_RATE)
}

/// Lifecycle multiplier and hype impact for a song of the given age.
pub fn compute_lifecycle(age: u32, song: &Song, month: u32, genre_longevity: f64) -> Lifecycle {
    if let Some(multiplier) = seasonal_override(song, month) {
        let hype_impact = if multiplier > 1.0 { 1.0 } else { 0.1 };
        return Lifecycle {
            phase: LifecyclePhase::Seasonal,
            multiplier,
            hype_impact,
        };
    }
    let profile = kind_profile(song.kind);
    if age <= FRESH_WEEKS {
        Lifecycle {
            phase: LifecyclePhase::Fresh,
            multiplier: profile.fresh_multiplier,
            hype_impact: profile.fresh_hype,
        }
    } else if age <= ACTIVE_WEEKS {
        Lifecycle {
            phase: LifecyclePhase::Active,
            multiplier: 1.0,
            hype_impact: 0.8,
        }
    } else {
        let rate = legacy_decay_rate(song, genre_longevity);
        let weeks = (age - ACTIVE_WEEKS).min(i32::MAX as u32) as i32;
        Lifecycle {
            phase: LifecyclePhase::Legacy,
            multiplier: rate.powi(weeks).max(LEGACY_FLOOR),
            hype_impact: 0.1,
        }
    }
}
