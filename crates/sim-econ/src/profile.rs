//! Per-kind tuning rows. Every system that behaves differently for singles and
//! catalog tracks reads its constants from here instead of branching inline.

use sim_core::SongKind;

/// Constants that depend only on a song's kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KindProfile {
    /// Lifecycle multiplier during the fresh phase.
    pub fresh_multiplier: f64,
    /// Hype impact during the fresh phase.
    pub fresh_hype: f64,
    /// Subtracted from the legacy decay rate.
    pub legacy_decay_penalty: f64,
    /// Share of a genre-trend swing that reaches the song.
    pub trend_passthrough: f64,
    /// Weight of the release-time popularity snapshot.
    pub snapshot_weight: f64,
    /// Weight of current popularity. Kept separate so the blend stays exact.
    pub current_weight: f64,
    /// Contribution to the monthly listener estimate.
    pub listener_weight: f64,
    /// Whether promo strategies apply.
    pub promotable: bool,
}

pub const SINGLE_PROFILE: KindProfile = KindProfile {
    fresh_multiplier: 1.5,
    fresh_hype: 1.5,
    legacy_decay_penalty: 0.0,
    trend_passthrough: 1.0,
    snapshot_weight: 0.5,
    current_weight: 0.5,
    listener_weight: 1.0,
    promotable: true,
};

pub const TRACK_PROFILE: KindProfile = KindProfile {
    fresh_multiplier: 1.2,
    fresh_hype: 1.0,
    legacy_decay_penalty: 0.05,
    trend_passthrough: 0.1,
    snapshot_weight: 0.9,
    current_weight: 0.1,
    listener_weight: 0.4,
    promotable: false,
};

pub fn kind_profile(kind: SongKind) -> &'static KindProfile {
    match kind {
        SongKind::Single => &SINGLE_PROFILE,
        SongKind::Track => &TRACK_PROFILE,
    }
}
