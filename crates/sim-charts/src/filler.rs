//! Deterministic filler rows that pad a chart to its display length.
//!
//! Fillers are synthetic non-player acts. Their names come from a small fixed
//! bank indexed by an FNV hash of `(chart key, slot)`, so the same chart
//! always shows the same fillers in the same slots.

use sim_core::hashing::{hash_pair, unit_from_hash};
use sim_core::{ChartEntity, ChartEntry, ChartKey};
use std::collections::HashMap;

use crate::rank::{entry_for, Candidate};

/// Starting score for song-chart fillers.
pub const SONG_FILLER_BASE: f64 = 50.0;
/// Starting score for album-chart fillers.
pub const ALBUM_FILLER_BASE: f64 = 500.0;
/// Geometric decay per rank.
pub const FILLER_DECAY: f64 = 0.95;

const FILLER_ARTISTS: [&str; 16] = [
    "Neon Harbor",
    "The Paper Lanterns",
    "Velvet Static",
    "Marlow & The Tides",
    "Juniper Vale",
    "Cold Signal",
    "Saint Avenue",
    "The Glass Orchards",
    "Lumen Drive",
    "Ivy Parade",
    "North Atlas",
    "Honey Circuit",
    "Ruby Lowlands",
    "The Quiet Engines",
    "Amber Tram",
    "Fox & Meridian",
];

const FILLER_TITLES: [&str; 16] = [
    "Slow Satellites",
    "Paper Hearts",
    "Midnight Freeway",
    "Glow",
    "Another Summer",
    "Static Love",
    "Falling Upward",
    "Open Water",
    "Golden Hour",
    "Borrowed Time",
    "City Lights",
    "Echoes",
    "Little Thunder",
    "Southbound",
    "Stay a While",
    "Afterglow",
];

/// Filler score at `rank`, never above `FILLER_DECAY` times the row above.
///
/// Example:
/// assert_eq!(filler_score(500.0, 1, None), 500.0);
pub fn filler_score(base: f64, rank: u32, score_above: Option<f64>) -> f64 {
    let geometric = base * FILLER_DECAY.powi(rank.saturating_sub(1) as i32);
    match score_above {
        Some(above) => geometric.min(above * FILLER_DECAY),
        None => geometric,
    }
}

/// Artist and title for a filler slot.
pub fn filler_names(key: &ChartKey, slot: u32) -> (&'static str, &'static str) {
    let key = key.to_string();
    let slot = slot.to_string();
    let pick = |h: u64| (unit_from_hash(h) * 16.0) as usize % 16;
    let artist = FILLER_ARTISTS[pick(hash_pair(&key, &slot))];
    let title = FILLER_TITLES[pick(hash_pair(&slot, &key))];
    (artist, title)
}

/// Append fillers until `entries` holds `target` rows. Rows already at or
/// beyond `target` are left alone. Fillers carry movement and weeks-on-chart
/// against their own slot in `previous`.
pub fn pad_with_fillers(
    entries: &mut Vec<ChartEntry>,
    key: &ChartKey,
    target: usize,
    base: f64,
    previous: &[ChartEntry],
) {
    if entries.len() >= target {
        return;
    }
    let before: HashMap<&ChartEntity, &ChartEntry> = previous
        .iter()
        .filter(|e| e.entity.is_filler())
        .map(|e| (&e.entity, e))
        .collect();

    let mut slot = 0u32;
    while entries.len() < target {
        slot += 1;
        let rank = entries.len() as u32 + 1;
        let score = filler_score(base, rank, entries.last().map(|e| e.score));
        let (artist, title) = filler_names(key, slot);
        let entity = ChartEntity::Filler { slot };
        let prev = before.get(&entity).copied();
        let candidate = Candidate {
            entity,
            title: title.to_string(),
            artist: artist.to_string(),
            is_player: false,
            score,
            metric_primary: 0,
            metric_secondary: 0,
            has_charted: false,
        };
        entries.push(entry_for(rank, candidate, prev));
    }
}
