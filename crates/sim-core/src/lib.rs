#![deny(warnings)]

//! Core domain models and invariants for Hit Tycoon.
//!
//! This crate defines the serializable game snapshot (songs, albums, videos,
//! regions, charts), the game calendar, static lookup tables, and validation
//! helpers that guard the invariants the weekly engine relies on.

pub mod clock;
pub mod config;
pub mod hashing;
pub mod model;

pub use clock::{validate_clock, GameClock, WEEKS_PER_MONTH, WEEKS_PER_YEAR};
pub use config::{
    ConfigError, GenreProfile, ProductionProfile, ProductionTier, PromoProfile, RegionProfile,
    SimConfig, WorldConstants, DEFAULT_CHART_WEIGHT,
};
pub use model::*;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use thiserror::Error;

/// Random source threaded through every stochastic system.
pub type SimRng = ChaCha8Rng;

/// Seeded generator for reproducible runs.
pub fn seeded_rng(seed: u64) -> SimRng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Validation errors for domain invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Quality outside [0, 100].
    #[error("quality {0} is out of range [0, 100]")]
    QualityOutOfRange(u8),
    /// Week of month outside [1, 4].
    #[error("week {0} is out of range [1, 4]")]
    WeekOutOfRange(u32),
    /// Month outside [1, 12].
    #[error("month {0} is out of range [1, 12]")]
    MonthOutOfRange(u32),
    /// Calendar year earlier than the career start.
    #[error("year {0} is before the career start")]
    YearBeforeStart(i32),
    /// Popularity outside [0, 100] or not finite.
    #[error("popularity for region {0} is out of range [0, 100]")]
    PopularityOutOfRange(String),
    /// Market size must be strictly positive.
    #[error("market size for region {0} must be > 0")]
    NonPositiveMarket(String),
    /// Money must be non-negative.
    #[error("negative monetary value is invalid")]
    NegativeMoney,
    /// Duplicate identifier in a collection.
    #[error("duplicate id: {0}")]
    DuplicateId(String),
    /// Reference to an entity that does not exist.
    #[error("dangling reference: {0}")]
    DanglingReference(String),
    /// Album track with the wrong kind or owner.
    #[error("album {0} has an invalid track list")]
    InvalidTrackList(String),
    /// Chart key string that cannot be parsed.
    #[error("unknown chart key: {0}")]
    UnknownChartKey(String),
    /// Chart ranks not dense from 1 or not ordered by score.
    #[error("chart {0} ranks are not dense and score-ordered")]
    ChartOrder(String),
}

fn check_quality(q: u8) -> Result<(), ValidationError> {
    if q > 100 {
        return Err(ValidationError::QualityOutOfRange(q));
    }
    Ok(())
}

/// Validate a region.
pub fn validate_region(r: &RegionStats) -> Result<(), ValidationError> {
    if !r.popularity.is_finite() || !(0.0..=100.0).contains(&r.popularity) {
        return Err(ValidationError::PopularityOutOfRange(r.id.0.clone()));
    }
    if !(r.market_size.is_finite() && r.market_size > 0.0) {
        return Err(ValidationError::NonPositiveMarket(r.id.0.clone()));
    }
    Ok(())
}

/// Validate a song's static attributes.
pub fn validate_song(s: &Song) -> Result<(), ValidationError> {
    check_quality(s.quality)?;
    if s.total_revenue < Decimal::ZERO {
        return Err(ValidationError::NegativeMoney);
    }
    Ok(())
}

/// Validate a video's quality axes.
pub fn validate_video(v: &YouTubeVideo) -> Result<(), ValidationError> {
    check_quality(v.production_quality)?;
    check_quality(v.concept_quality)?;
    check_quality(v.thumbnail_quality)?;
    if v.total_revenue < Decimal::ZERO {
        return Err(ValidationError::NegativeMoney);
    }
    Ok(())
}

/// Validate rank density and score ordering of one chart.
pub fn validate_chart(key: &ChartKey, entries: &[ChartEntry]) -> Result<(), ValidationError> {
    for (i, e) in entries.iter().enumerate() {
        let dense = e.rank as usize == i + 1;
        let ordered = i == 0 || entries[i - 1].score >= e.score;
        if !dense || !ordered || e.peak_rank > e.rank {
            return Err(ValidationError::ChartOrder(key.to_string()));
        }
    }
    Ok(())
}

/// Validate the whole snapshot, including cross-references.
pub fn validate_state(state: &GameState) -> Result<(), ValidationError> {
    validate_clock(&state.clock)?;
    if state.player.money < Decimal::ZERO {
        return Err(ValidationError::NegativeMoney);
    }
    let mut region_ids = BTreeSet::new();
    for r in &state.regions {
        validate_region(r)?;
        if !region_ids.insert(&r.id) {
            return Err(ValidationError::DuplicateId(r.id.0.clone()));
        }
    }
    let mut song_ids = BTreeSet::new();
    for s in &state.songs {
        validate_song(s)?;
        if !song_ids.insert(&s.id) {
            return Err(ValidationError::DuplicateId(s.id.0.clone()));
        }
        if let ArtistRef::Npc(id) = &s.artist {
            if state.npc(id).is_none() {
                return Err(ValidationError::DanglingReference(id.0.clone()));
            }
        }
    }
    for a in &state.albums {
        if a.track_ids.is_empty() {
            return Err(ValidationError::InvalidTrackList(a.id.0.clone()));
        }
        for t in &a.track_ids {
            let song = state
                .song(t)
                .ok_or_else(|| ValidationError::DanglingReference(t.0.clone()))?;
            if song.album_id.as_ref() != Some(&a.id) || song.artist != a.artist {
                return Err(ValidationError::InvalidTrackList(a.id.0.clone()));
            }
        }
    }
    for v in &state.videos {
        validate_video(v)?;
        if let Some(song_id) = &v.song_id {
            if state.song(song_id).is_none() {
                return Err(ValidationError::DanglingReference(song_id.0.clone()));
            }
        }
    }
    for (key, entries) in &state.charts {
        validate_chart(key, entries)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    fn state() -> GameState {
        let constants = WorldConstants::builtin();
        GameState {
            clock: GameClock::new(2025),
            player: PlayerProfile {
                name: "Nova".to_string(),
                money: Decimal::new(50_000, 0),
                hype: 10.0,
                monthly_listeners: 0,
            },
            regions: constants.initial_regions(),
            songs: vec![],
            albums: vec![],
            videos: vec![],
            npcs: vec![],
            genre_trends: BTreeMap::new(),
            charts: BTreeMap::new(),
            next_id: 0,
        }
    }

    fn song(id: &str, kind: SongKind) -> Song {
        Song::new(
            SongId(id.to_string()),
            "Title",
            ArtistRef::Player,
            GenreId("pop".to_string()),
            kind,
            70,
            1,
        )
    }

    #[test]
    fn state_snapshot_roundtrip() {
        let mut st = state();
        st.songs.push(song("song-1", SongKind::Single));
        st.charts.insert(ChartKey::RegionAlbums(RegionId::usa()), vec![]);
        validate_state(&st).unwrap();
        let s = serde_json::to_string_pretty(&st).unwrap();
        let back: GameState = serde_json::from_str(&s).unwrap();
        assert_eq!(back.songs.len(), 1);
        assert!(back
            .charts
            .contains_key(&ChartKey::RegionAlbums(RegionId::usa())));
    }

    #[test]
    fn chart_key_string_form() {
        assert_eq!(ChartKey::Hot100.to_string(), "HOT_100");
        assert_eq!(
            ChartKey::try_from("SONGS_UK".to_string()).unwrap(),
            ChartKey::RegionSongs(RegionId("UK".into()))
        );
        assert!(ChartKey::try_from("SONGS_".to_string()).is_err());
    }

    #[test]
    fn album_track_must_point_back() {
        let mut st = state();
        st.songs.push(song("song-1", SongKind::Track));
        st.albums.push(Album {
            id: AlbumId("album-1".into()),
            title: "LP".into(),
            artist: ArtistRef::Player,
            track_ids: vec![SongId("song-1".into())],
            quality: 70.0,
            release_week: 1,
            theme: None,
            total_sales: 0,
            weekly_sales: 0,
            has_charted: false,
        });
        assert_eq!(
            validate_state(&st),
            Err(ValidationError::InvalidTrackList("album-1".into()))
        );
        st.songs[0].album_id = Some(AlbumId("album-1".into()));
        assert!(validate_state(&st).is_ok());
    }

    #[test]
    fn dangling_npc_is_rejected() {
        let mut st = state();
        let mut s = song("song-1", SongKind::Single);
        s.artist = ArtistRef::Npc(NpcId("npc-9".into()));
        st.songs.push(s);
        assert_eq!(
            validate_state(&st),
            Err(ValidationError::DanglingReference("npc-9".into()))
        );
    }

    #[test]
    fn empty_region_average_is_zero() {
        assert_eq!(average_popularity(&[]), 0.0);
    }

    proptest! {
        #[test]
        fn any_valid_quality_passes(q in 0u8..=100) {
            let mut s = song("song-1", SongKind::Single);
            s.quality = q;
            prop_assert!(validate_song(&s).is_ok());
        }

        #[test]
        fn popularity_outside_range_fails(p in 100.01f64..1_000.0) {
            let r = RegionStats { id: RegionId::usa(), name: "US".into(), popularity: p, market_size: 1.0 };
            prop_assert!(validate_region(&r).is_err());
        }
    }
}
