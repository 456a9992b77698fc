#![deny(warnings)]

//! Weekly performance models for songs, artists and videos.
//!
//! Every calculator here is a pure function of its inputs plus an injected
//! random source:
//! - Variance: per-week quality-aware noise, with sleeper/flop outcomes for
//!   catalog tracks
//! - Lifecycle: fresh/active/legacy phases and the seasonal override
//! - Trend: genre trend, seasonal themes and weekly trend drift
//! - Region: how much a song follows current fame versus release-time fame
//! - Weekly: streams, sales, revenue and hype for one song-week
//! - Listeners: smoothed monthly listeners for the player and NPC artists
//! - Video: views, engagement and ad revenue for uploaded videos

pub mod lifecycle;
pub mod listeners;
pub mod profile;
pub mod region;
pub mod trend;
pub mod variance;
pub mod video;
pub mod weekly;

pub use lifecycle::{compute_lifecycle, Lifecycle, LifecyclePhase};
pub use listeners::{estimate_listeners, ListenerArtist, ListenerSeason};
pub use profile::{kind_profile, KindProfile};
pub use region::{compute_region_power, song_region_power, FameSource};
pub use trend::{compute_trend, drift_genre_trends, genre_trend};
pub use variance::compute_variance;
pub use video::{apply_video_week, compute_video_week, roll_video_virality, VideoWeek};
pub use weekly::{
    apply_song_week, compute_song_week, roll_song_virality, simulate_song_week, ArtistContext,
    SongWeek, WeekContext,
};
