//! Serializable game entities: songs, albums, regions, videos, charts and the
//! top-level [`GameState`] snapshot that every weekly tick reads and rewrites.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::clock::GameClock;
use crate::ValidationError;

/// Unique identifier for a song, e.g. "song-12".
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SongId(pub String);

/// Unique identifier for an album.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AlbumId(pub String);

/// Unique identifier for an uploaded video.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VideoId(pub String);

/// Unique identifier for a non-player artist.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NpcId(pub String);

/// Region identifier, e.g. "USA", "UK".
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RegionId(pub String);

/// Genre identifier, e.g. "pop", "hip-hop".
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GenreId(pub String);

impl RegionId {
    pub fn usa() -> Self {
        RegionId("USA".to_string())
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Theme id that switches a song onto the December seasonal curve.
pub const THEME_CHRISTMAS: &str = "christmas";
/// Theme id that switches a song onto the October seasonal curve.
pub const THEME_HALLOWEEN: &str = "halloween";

/// Release type of a song. Immutable after creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SongKind {
    /// Lead single, promoted and loosely locked to release-time fame.
    Single,
    /// Album cut / catalog track.
    Track,
}

/// Who released a piece of content.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArtistRef {
    Player,
    Npc(NpcId),
}

impl ArtistRef {
    pub fn is_player(&self) -> bool {
        matches!(self, ArtistRef::Player)
    }
}

/// Paid promotion applied to a single.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PromoStrategy {
    #[default]
    None,
    SocialMedia,
    PlaylistPitch,
    RadioCampaign,
    ViralMarketing,
}

/// Weekly and cumulative figures for one song in one region.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionalPerformance {
    pub weekly_streams: u64,
    pub weekly_sales: u64,
    pub total_streams: u64,
    pub total_sales: u64,
}

/// A released song and its running performance.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Song {
    pub id: SongId,
    pub title: String,
    pub artist: ArtistRef,
    pub genre: GenreId,
    /// Optional theme id (see [`THEME_CHRISTMAS`], [`THEME_HALLOWEEN`]).
    pub theme: Option<String>,
    pub kind: SongKind,
    /// Quality score in [0, 100].
    pub quality: u8,
    /// Absolute week the song was released.
    pub release_week: u32,
    /// Regional popularity captured at release. Never overwritten.
    pub release_popularity: BTreeMap<RegionId, f64>,
    #[serde(default)]
    pub promo: PromoStrategy,
    pub album_id: Option<AlbumId>,
    pub total_streams: u64,
    pub total_sales: u64,
    pub total_revenue: Decimal,
    pub weekly_streams: u64,
    pub weekly_sales: u64,
    pub regional: BTreeMap<RegionId, RegionalPerformance>,
    pub is_viral: bool,
    pub viral_weeks_remaining: u32,
    pub has_charted: bool,
    pub peak_weekly_streams: u64,
}

impl Song {
    /// Build a freshly released song with zeroed performance.
    pub fn new(
        id: SongId,
        title: impl Into<String>,
        artist: ArtistRef,
        genre: GenreId,
        kind: SongKind,
        quality: u8,
        release_week: u32,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            artist,
            genre,
            theme: None,
            kind,
            quality: quality.min(100),
            release_week,
            release_popularity: BTreeMap::new(),
            promo: PromoStrategy::None,
            album_id: None,
            total_streams: 0,
            total_sales: 0,
            total_revenue: Decimal::ZERO,
            weekly_streams: 0,
            weekly_sales: 0,
            regional: BTreeMap::new(),
            is_viral: false,
            viral_weeks_remaining: 0,
            has_charted: false,
            peak_weekly_streams: 0,
        }
    }

    pub fn is_single(&self) -> bool {
        self.kind == SongKind::Single
    }

    /// Age in weeks at the given absolute week. Zero for unreleased songs.
    pub fn age_at(&self, absolute_week: u32) -> u32 {
        absolute_week.saturating_sub(self.release_week)
    }

    /// Whether the viral boost applies this week.
    pub fn viral_active(&self) -> bool {
        self.is_viral && self.viral_weeks_remaining > 0
    }

    pub fn has_theme(&self, theme: &str) -> bool {
        self.theme.as_deref() == Some(theme)
    }
}

/// A collection of tracks released together.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Album {
    pub id: AlbumId,
    pub title: String,
    pub artist: ArtistRef,
    pub track_ids: Vec<SongId>,
    /// Mean of the track qualities.
    pub quality: f64,
    pub release_week: u32,
    pub theme: Option<String>,
    pub total_sales: u64,
    pub weekly_sales: u64,
    pub has_charted: bool,
}

/// Artist fame in one region.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegionStats {
    pub id: RegionId,
    pub name: String,
    /// Current popularity in [0, 100].
    pub popularity: f64,
    /// Relative market weight (static).
    pub market_size: f64,
}

/// Video formats with independent view curves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum VideoKind {
    OfficialMv,
    LyricVideo,
    Performance,
    Shorts,
}

/// An uploaded video and its running performance.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct YouTubeVideo {
    pub id: VideoId,
    pub title: String,
    pub song_id: Option<SongId>,
    pub kind: VideoKind,
    pub production_quality: u8,
    pub concept_quality: u8,
    pub thumbnail_quality: u8,
    pub upload_week: u32,
    pub is_viral: bool,
    pub viral_weeks_remaining: u32,
    pub total_views: u64,
    pub weekly_views: u64,
    pub likes: u64,
    pub comments: u64,
    pub total_revenue: Decimal,
    pub monetized: bool,
}

impl YouTubeVideo {
    pub fn age_at(&self, absolute_week: u32) -> u32 {
        absolute_week.saturating_sub(self.upload_week)
    }

    pub fn viral_active(&self) -> bool {
        self.is_viral && self.viral_weeks_remaining > 0
    }
}

/// Week-over-week rank change classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Movement {
    #[serde(rename = "new")]
    New,
    #[serde(rename = "re-entry")]
    ReEntry,
    #[serde(rename = "up")]
    Up,
    #[serde(rename = "down")]
    Down,
    #[serde(rename = "stable")]
    Stable,
}

/// What a chart row refers to. Fillers are synthetic and never real content.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ChartEntity {
    Song(SongId),
    Album(AlbumId),
    Filler { slot: u32 },
}

impl ChartEntity {
    pub fn is_filler(&self) -> bool {
        matches!(self, ChartEntity::Filler { .. })
    }
}

/// One ranked row of a chart snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChartEntry {
    pub rank: u32,
    pub previous_rank: Option<u32>,
    pub entity: ChartEntity,
    pub title: String,
    pub artist: String,
    pub is_player: bool,
    pub score: f64,
    /// Streams for song charts, sales for album charts.
    pub metric_primary: u64,
    /// Sales for song charts, track count for album charts.
    pub metric_secondary: u64,
    pub weeks_on_chart: u32,
    pub peak_rank: u32,
    pub movement: Movement,
}

/// Identifies one persisted chart.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ChartKey {
    Hot100,
    Global200,
    RegionSongs(RegionId),
    GlobalAlbums,
    RegionAlbums(RegionId),
}

impl ChartKey {
    pub fn is_album_chart(&self) -> bool {
        matches!(self, ChartKey::GlobalAlbums | ChartKey::RegionAlbums(_))
    }
}

impl fmt::Display for ChartKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartKey::Hot100 => f.write_str("HOT_100"),
            ChartKey::Global200 => f.write_str("GLOBAL_200"),
            ChartKey::RegionSongs(r) => write!(f, "SONGS_{}", r.0),
            ChartKey::GlobalAlbums => f.write_str("GLOBAL_ALBUMS"),
            ChartKey::RegionAlbums(r) => write!(f, "ALBUMS_{}", r.0),
        }
    }
}

impl From<ChartKey> for String {
    fn from(key: ChartKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for ChartKey {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.as_str() {
            "HOT_100" => Ok(ChartKey::Hot100),
            "GLOBAL_200" => Ok(ChartKey::Global200),
            "GLOBAL_ALBUMS" => Ok(ChartKey::GlobalAlbums),
            other => {
                if let Some(r) = other.strip_prefix("SONGS_").filter(|r| !r.is_empty()) {
                    Ok(ChartKey::RegionSongs(RegionId(r.to_string())))
                } else if let Some(r) = other.strip_prefix("ALBUMS_").filter(|r| !r.is_empty()) {
                    Ok(ChartKey::RegionAlbums(RegionId(r.to_string())))
                } else {
                    Err(ValidationError::UnknownChartKey(other.to_string()))
                }
            }
        }
    }
}

/// A competing non-player artist.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NpcArtist {
    pub id: NpcId,
    pub name: String,
    pub genre: GenreId,
    /// Worldwide popularity in [0, 100]; stands in for regional fame.
    pub global_popularity: f64,
    pub monthly_listeners: u64,
    /// Baseline weekly inclination to release, in [0, 1].
    pub release_propensity: f64,
    pub last_release_week: Option<u32>,
}

/// The player's artist.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub name: String,
    pub money: Decimal,
    /// Accumulated hype, clamped to [0, 1000].
    pub hype: f64,
    pub monthly_listeners: u64,
}

/// Full in-memory snapshot owned by the simulation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameState {
    pub clock: GameClock,
    pub player: PlayerProfile,
    pub regions: Vec<RegionStats>,
    pub songs: Vec<Song>,
    pub albums: Vec<Album>,
    pub videos: Vec<YouTubeVideo>,
    pub npcs: Vec<NpcArtist>,
    pub genre_trends: BTreeMap<GenreId, f64>,
    pub charts: BTreeMap<ChartKey, Vec<ChartEntry>>,
    pub next_id: u64,
}

impl GameState {
    /// Hand out a fresh id with the given prefix, e.g. "song-7".
    pub fn allocate_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    pub fn song(&self, id: &SongId) -> Option<&Song> {
        self.songs.iter().find(|s| &s.id == id)
    }

    pub fn song_mut(&mut self, id: &SongId) -> Option<&mut Song> {
        self.songs.iter_mut().find(|s| &s.id == id)
    }

    pub fn album(&self, id: &AlbumId) -> Option<&Album> {
        self.albums.iter().find(|a| &a.id == id)
    }

    pub fn npc(&self, id: &NpcId) -> Option<&NpcArtist> {
        self.npcs.iter().find(|n| &n.id == id)
    }

    pub fn region(&self, id: &RegionId) -> Option<&RegionStats> {
        self.regions.iter().find(|r| &r.id == id)
    }

    /// Mean regional popularity; 0 when there are no regions.
    pub fn average_region_popularity(&self) -> f64 {
        average_popularity(&self.regions)
    }

    /// Display name for an artist reference.
    pub fn artist_name(&self, artist: &ArtistRef) -> String {
        match artist {
            ArtistRef::Player => self.player.name.clone(),
            ArtistRef::Npc(id) => self
                .npc(id)
                .map(|n| n.name.clone())
                .unwrap_or_else(|| id.0.clone()),
        }
    }

    /// Popularity snapshot of every region, as stored on a new release.
    pub fn popularity_snapshot(&self) -> BTreeMap<RegionId, f64> {
        self.regions
            .iter()
            .map(|r| (r.id.clone(), r.popularity))
            .collect()
    }

    pub fn chart(&self, key: &ChartKey) -> &[ChartEntry] {
        self.charts.get(key).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Mean popularity over a region list; 0 for an empty list.
pub fn average_popularity(regions: &[RegionStats]) -> f64 {
    if regions.is_empty() {
        return 0.0;
    }
    regions.iter().map(|r| r.popularity).sum::<f64>() / regions.len() as f64
}
