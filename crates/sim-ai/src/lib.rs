#![deny(warnings)]

//! NPC content simulator: weekly release decisions for non-player artists.
//!
//! Each NPC rolls a release utility every week. Releases become ordinary
//! songs (and sometimes albums) in the shared state, so rival content runs
//! through the same weekly performance engine and charts as the player's.

use rand::Rng;
use sim_core::hashing::{hash_pair, unit_from_hash};
use sim_core::{
    Album, AlbumId, ArtistRef, GameState, NpcArtist, NpcId, Song, SongId, SongKind,
};
use sim_econ::roll_song_virality;
use tracing::debug;

/// Weeks after a release during which an NPC will not release again.
pub const RELEASE_COOLDOWN_WEEKS: u32 = 4;
/// Share of releases that are albums rather than singles.
pub const ALBUM_CHANCE: f64 = 0.15;
pub const MIN_ALBUM_TRACKS: usize = 4;
pub const MAX_ALBUM_TRACKS: usize = 8;
/// Half-width of the quality band around an NPC's expected quality.
pub const QUALITY_SPREAD: f64 = 15.0;

/// What an NPC decided to put out this week.
#[derive(Clone, Debug, PartialEq)]
pub enum ReleaseKind {
    Single { quality: u8 },
    Album { qualities: Vec<u8> },
}

/// A release decision, not yet applied to the state.
#[derive(Clone, Debug, PartialEq)]
pub struct ReleasePlan {
    pub npc: NpcId,
    pub kind: ReleaseKind,
}

/// 0 inside the cooldown window after the last release, 1 otherwise.
pub fn cooldown_factor(npc: &NpcArtist, week: u32) -> f64 {
    match npc.last_release_week {
        Some(last) if week.saturating_sub(last) < RELEASE_COOLDOWN_WEEKS => 0.0,
        _ => 1.0,
    }
}

/// Weekly release probability: `propensity * (0.5 + pop / 200) * cooldown`.
///
/// Example:
/// an NPC with propensity 0.2 and popularity 100 releases 20% of weeks.
pub fn release_utility(npc: &NpcArtist, week: u32) -> f64 {
    let propensity = npc.release_propensity.clamp(0.0, 1.0);
    let reach = 0.5 + npc.global_popularity.clamp(0.0, 100.0) / 200.0;
    (propensity * reach * cooldown_factor(npc, week)).clamp(0.0, 1.0)
}

/// Quality for a draw `u` in [0, 1): `40 + pop / 2`, spread by +/-15.
pub fn quality_from_draw(global_popularity: f64, u: f64) -> u8 {
    let centre = 40.0 + global_popularity.clamp(0.0, 100.0) * 0.5;
    let q = centre + (2.0 * u - 1.0) * QUALITY_SPREAD;
    q.round().clamp(0.0, 100.0) as u8
}

/// Roll this week's decision for one NPC.
pub fn decide_release<R: Rng + ?Sized>(
    npc: &NpcArtist,
    week: u32,
    rng: &mut R,
) -> Option<ReleasePlan> {
    let utility = release_utility(npc, week);
    if utility <= 0.0 || rng.gen::<f64>() >= utility {
        return None;
    }
    let kind = if rng.gen::<f64>() < ALBUM_CHANCE {
        let tracks = rng.gen_range(MIN_ALBUM_TRACKS..=MAX_ALBUM_TRACKS);
        ReleaseKind::Album {
            qualities: (0..tracks)
                .map(|_| quality_from_draw(npc.global_popularity, rng.gen()))
                .collect(),
        }
    } else {
        ReleaseKind::Single {
            quality: quality_from_draw(npc.global_popularity, rng.gen()),
        }
    };
    Some(ReleasePlan {
        npc: npc.id.clone(),
        kind,
    })
}

/// Decisions for every NPC, in roster order.
pub fn plan_releases<R: Rng + ?Sized>(
    npcs: &[NpcArtist],
    week: u32,
    rng: &mut R,
) -> Vec<ReleasePlan> {
    npcs.iter()
        .filter_map(|npc| decide_release(npc, week, rng))
        .collect()
}

const TITLE_OPENERS: [&str; 12] = [
    "Neon", "Paper", "Golden", "Silent", "Electric", "Midnight", "Crystal", "Wild", "Velvet",
    "Broken", "Summer", "Hollow",
];
const TITLE_CLOSERS: [&str; 12] = [
    "Skies", "Hearts", "Roads", "Signals", "Rivers", "Dreams", "Lights", "Echoes", "Flames",
    "Tides", "Letters", "Waves",
];

/// Deterministic title for a new release id.
pub fn release_title(npc: &NpcId, release_id: &str) -> String {
    let h = hash_pair(&npc.0, release_id);
    let a = (unit_from_hash(h) * 12.0) as usize % 12;
    let b = (unit_from_hash(h.rotate_left(29)) * 12.0) as usize % 12;
    format!("{} {}", TITLE_OPENERS[a], TITLE_CLOSERS[b])
}

fn npc_song<R: Rng + ?Sized>(
    state: &mut GameState,
    npc: &NpcArtist,
    kind: SongKind,
    quality: u8,
    week: u32,
    rng: &mut R,
) -> Song {
    let id = state.allocate_id("song");
    let title = release_title(&npc.id, &id);
    let mut song = Song::new(
        SongId(id),
        title,
        ArtistRef::Npc(npc.id.clone()),
        npc.genre.clone(),
        kind,
        quality,
        week,
    );
    song.release_popularity = state
        .regions
        .iter()
        .map(|r| (r.id.clone(), npc.global_popularity))
        .collect();
    if let Some(weeks) = roll_song_virality(quality, rng) {
        song.is_viral = true;
        song.viral_weeks_remaining = weeks;
    }
    song
}

/// Materialise a plan into songs (and an album) owned by the NPC, and start
/// its cooldown. Returns the new song ids; unknown NPCs are skipped.
pub fn apply_release<R: Rng + ?Sized>(
    state: &mut GameState,
    plan: &ReleasePlan,
    rng: &mut R,
) -> Vec<SongId> {
    let week = state.clock.absolute_week();
    let Some(npc) = state.npc(&plan.npc).cloned() else {
        return Vec::new();
    };

    let ids = match &plan.kind {
        ReleaseKind::Single { quality } => {
            let song = npc_song(state, &npc, SongKind::Single, *quality, week, rng);
            let id = song.id.clone();
            state.songs.push(song);
            vec![id]
        }
        ReleaseKind::Album { qualities } => {
            let album_id = AlbumId(state.allocate_id("album"));
            let mut ids = Vec::with_capacity(qualities.len());
            for &q in qualities {
                let mut song = npc_song(state, &npc, SongKind::Track, q, week, rng);
                song.album_id = Some(album_id.clone());
                ids.push(song.id.clone());
                state.songs.push(song);
            }
            let quality = if qualities.is_empty() {
                0.0
            } else {
                qualities.iter().map(|&q| q as f64).sum::<f64>() / qualities.len() as f64
            };
            let title = release_title(&npc.id, &album_id.0);
            state.albums.push(Album {
                id: album_id,
                title,
                artist: ArtistRef::Npc(npc.id.clone()),
                track_ids: ids.clone(),
                quality,
                release_week: week,
                theme: None,
                total_sales: 0,
                weekly_sales: 0,
                has_charted: false,
            });
            ids
        }
    };

    if let Some(n) = state.npcs.iter_mut().find(|n| n.id == plan.npc) {
        n.last_release_week = Some(week);
    }
    debug!(npc = %npc.name, songs = ids.len(), week, "npc release");
    ids
}

/// Roll and apply this week's NPC releases. Returns how many songs landed.
pub fn run_npc_releases<R: Rng + ?Sized>(state: &mut GameState, rng: &mut R) -> usize {
    let week = state.clock.absolute_week();
    let plans = plan_releases(&state.npcs, week, rng);
    plans
        .iter()
        .map(|plan| apply_release(state, plan, rng).len())
        .sum()
}
