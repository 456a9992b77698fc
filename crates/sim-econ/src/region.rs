//! Region lock: how much a song follows the artist's current fame versus the
//! fame captured when it was released.

use sim_core::{RegionStats, Song, SongKind};

use crate::profile::kind_profile;

/// Where the "current popularity" input comes from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FameSource {
    /// Player: each region's own popularity.
    Regional,
    /// NPC: one worldwide popularity applied to every region, both as current
    /// value and release snapshot.
    Global(f64),
}

/// Blend current and release-time popularity by song kind.
///
/// Example:
/// assert_eq!(compute_region_power(100.0, 0.0, SongKind::Single), 50.0);
/// assert_eq!(compute_region_power(100.0, 0.0, SongKind::Track), 10.0);
pub fn compute_region_power(current: f64, snapshot: f64, kind: SongKind) -> f64 {
    let p = kind_profile(kind);
    p.snapshot_weight * snapshot + p.current_weight * current
}

/// Region power for a song in one region. A missing snapshot entry (region
/// added after release) falls back to the current value.
pub fn song_region_power(song: &Song, region: &RegionStats, fame: FameSource) -> f64 {
    match fame {
        FameSource::Global(popularity) => compute_region_power(popularity, popularity, song.kind),
        FameSource::Regional => {
            let snapshot = song
                .release_popularity
                .get(&region.id)
                .copied()
                .unwrap_or(region.popularity);
            compute_region_power(region.popularity, snapshot, song.kind)
        }
    }
}
