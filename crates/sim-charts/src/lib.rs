#![deny(warnings)]

//! Chart Engine: turns a week of song and album metrics into ranked chart
//! snapshots.
//!
//! Each chart key is a small state machine over last week's snapshot:
//! score, drop non-positive, sort (ties by id), dense rank, movement,
//! weeks-on-chart and sticky peak, then truncate or pad with fillers.
//! Items that land on any chart are marked `has_charted` once every chart
//! for the week has been built.

pub mod filler;
pub mod rank;
pub mod score;

use sim_core::{
    ArtistRef, ChartEntity, ChartEntry, ChartKey, GameState, GenreId, RegionStats,
    WorldConstants,
};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

pub use filler::{pad_with_fillers, ALBUM_FILLER_BASE, SONG_FILLER_BASE};
pub use rank::{classify_movement, rank_candidates, Candidate};
pub use score::Scored;

/// Song charts never show more than this many rows.
pub const SONG_CHART_LEN: usize = 100;
/// GLOBAL_ALBUMS is always exactly this long.
pub const GLOBAL_ALBUM_CHART_LEN: usize = 200;
/// Regional album charts are always exactly this long.
pub const REGION_ALBUM_CHART_LEN: usize = 50;

/// Options that change chart shape.
#[derive(Clone, Copy, Debug, Default)]
pub struct ChartOptions {
    /// Pad song charts with fillers up to [`SONG_CHART_LEN`].
    pub pad_song_charts: bool,
}

/// Every chart key maintained for the given regions.
pub fn chart_keys(regions: &[RegionStats]) -> Vec<ChartKey> {
    let mut keys = vec![ChartKey::Hot100, ChartKey::Global200, ChartKey::GlobalAlbums];
    keys.extend(regions.iter().map(|r| ChartKey::RegionSongs(r.id.clone())));
    keys.extend(regions.iter().map(|r| ChartKey::RegionAlbums(r.id.clone())));
    keys
}

/// Display length and filler base for a key. `None` length means no padding.
fn chart_shape(key: &ChartKey, options: ChartOptions) -> (usize, Option<f64>) {
    match key {
        ChartKey::GlobalAlbums => (GLOBAL_ALBUM_CHART_LEN, Some(ALBUM_FILLER_BASE)),
        ChartKey::RegionAlbums(_) => (REGION_ALBUM_CHART_LEN, Some(ALBUM_FILLER_BASE)),
        _ if options.pad_song_charts => (SONG_CHART_LEN, Some(SONG_FILLER_BASE)),
        _ => (SONG_CHART_LEN, None),
    }
}

fn artist_flags(state: &GameState, artist: &ArtistRef) -> (String, bool) {
    (state.artist_name(artist), artist.is_player())
}

fn candidates(key: &ChartKey, state: &GameState, constants: &WorldConstants) -> Vec<Candidate> {
    if key.is_album_chart() {
        let total = score::total_market(&state.regions);
        let region = match key {
            ChartKey::RegionAlbums(id) => match state.region(id) {
                Some(r) => Some(r),
                None => return Vec::new(),
            },
            _ => None,
        };
        state
            .albums
            .iter()
            .map(|album| {
                let scored = match region {
                    Some(r) => score::region_album_score(album, r, total),
                    None => score::global_album_score(album, &state.regions, constants),
                };
                let (artist, is_player) = artist_flags(state, &album.artist);
                candidate(
                    ChartEntity::Album(album.id.clone()),
                    album.title.clone(),
                    artist,
                    is_player,
                    scored,
                    album.has_charted,
                )
            })
            .collect()
    } else {
        state
            .songs
            .iter()
            .map(|song| {
                let scored = match key {
                    ChartKey::Hot100 => score::hot100_score(song),
                    ChartKey::RegionSongs(id) => score::region_song_score(song, id),
                    _ => score::global_song_score(song, constants),
                };
                let (artist, is_player) = artist_flags(state, &song.artist);
                candidate(
                    ChartEntity::Song(song.id.clone()),
                    song.title.clone(),
                    artist,
                    is_player,
                    scored,
                    song.has_charted,
                )
            })
            .collect()
    }
}

fn candidate(
    entity: ChartEntity,
    title: String,
    artist: String,
    is_player: bool,
    scored: Scored,
    has_charted: bool,
) -> Candidate {
    Candidate {
        entity,
        title,
        artist,
        is_player,
        score: scored.score,
        metric_primary: scored.metric_primary,
        metric_secondary: scored.metric_secondary,
        has_charted,
    }
}

/// Build one chart against the snapshot currently stored in `state`.
/// Does not mutate anything; running it twice gives the same rows.
pub fn build_chart(
    key: &ChartKey,
    state: &GameState,
    constants: &WorldConstants,
    options: ChartOptions,
) -> Vec<ChartEntry> {
    let previous = state.chart(key);
    let (len, filler_base) = chart_shape(key, options);
    let mut entries = rank_candidates(candidates(key, state, constants), previous, len);
    let real = entries.len();
    if let Some(base) = filler_base {
        pad_with_fillers(&mut entries, key, len, base, previous);
    }
    debug!(chart = %key, real, fillers = entries.len() - real, "chart built");
    entries
}

/// Summary of one weekly chart update.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChartUpdate {
    pub charts_built: usize,
    /// Songs and albums that charted for the first time this week.
    pub first_time_entries: usize,
    /// Best player rank on the HOT_100, if any.
    pub player_best_hot100: Option<u32>,
}

/// Rebuild every chart, store the snapshots and mark charted items.
///
/// All charts are built from last week's snapshots and `has_charted` flags
/// before anything is written back, so an item debuting on several charts
/// is `new` on all of them.
pub fn update_charts(
    state: &mut GameState,
    constants: &WorldConstants,
    options: ChartOptions,
) -> ChartUpdate {
    let keys = chart_keys(&state.regions);
    let built: BTreeMap<ChartKey, Vec<ChartEntry>> = keys
        .into_iter()
        .map(|key| {
            let entries = build_chart(&key, state, constants, options);
            (key, entries)
        })
        .collect();

    let charted: BTreeSet<&ChartEntity> = built
        .values()
        .flatten()
        .map(|e| &e.entity)
        .filter(|e| !e.is_filler())
        .collect();
    let mut first_time_entries = 0;
    for song in state.songs.iter_mut() {
        if !song.has_charted && charted.contains(&ChartEntity::Song(song.id.clone())) {
            song.has_charted = true;
            first_time_entries += 1;
        }
    }
    for album in state.albums.iter_mut() {
        if !album.has_charted && charted.contains(&ChartEntity::Album(album.id.clone())) {
            album.has_charted = true;
            first_time_entries += 1;
        }
    }

    let player_best_hot100 = built
        .get(&ChartKey::Hot100)
        .and_then(|c| c.iter().find(|e| e.is_player).map(|e| e.rank));
    let update = ChartUpdate {
        charts_built: built.len(),
        first_time_entries,
        player_best_hot100,
    };
    state.charts.extend(built);
    info!(
        charts = update.charts_built,
        debuts = update.first_time_entries,
        player_best = ?update.player_best_hot100,
        "charts updated"
    );
    update
}

/// Genre of the current HOT_100 number one, if it is a song.
pub fn chart_leader_genre(state: &GameState) -> Option<GenreId> {
    state
        .chart(&ChartKey::Hot100)
        .first()
        .and_then(|e| match &e.entity {
            ChartEntity::Song(id) => state.song(id).map(|s| s.genre.clone()),
            _ => None,
        })
}
