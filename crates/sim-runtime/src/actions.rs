//! Player actions applied between weekly ticks.
//!
//! Every action validates and prices itself before touching the state, so a
//! rejected action leaves the snapshot exactly as it was.

use rand::Rng;
use rust_decimal::Decimal;
use sim_core::{
    Album, AlbumId, ArtistRef, GameState, GenreId, ProductionTier, PromoStrategy, RegionId, Song,
    SongId, SongKind, VideoId, VideoKind, WorldConstants, YouTubeVideo,
};
use sim_econ::{roll_song_virality, roll_video_virality};
use tracing::info;

use crate::systems::MONETIZATION_VIEWS;
use crate::SimError;

/// Popularity added to a region by one campaign.
pub const CAMPAIGN_BOOST: f64 = 5.0;
/// Campaign price per popularity point.
pub const CAMPAIGN_COST_PER_POINT: i64 = 10_000;

/// A song to record and release.
#[derive(Clone, Debug)]
pub struct SongDraft {
    pub title: String,
    pub genre: GenreId,
    pub theme: Option<String>,
    pub tier: ProductionTier,
    /// Fixed quality inside the tier's range; rolled when `None`.
    pub quality: Option<u8>,
}

/// An album. Each track is produced and priced at its own draft's tier.
#[derive(Clone, Debug)]
pub struct AlbumDraft {
    pub title: String,
    pub theme: Option<String>,
    pub tracks: Vec<SongDraft>,
}

#[derive(Clone, Debug)]
pub struct VideoDraft {
    pub title: String,
    pub song_id: Option<SongId>,
    pub kind: VideoKind,
    pub production_quality: u8,
    pub concept_quality: u8,
    pub thumbnail_quality: u8,
}

fn ensure_funds(state: &GameState, needed: Decimal) -> Result<(), SimError> {
    if state.player.money < needed {
        return Err(SimError::InsufficientFunds {
            needed,
            available: state.player.money,
        });
    }
    Ok(())
}

/// Price a draft and settle its quality, without mutating anything.
fn produce<R: Rng + ?Sized>(
    draft: &SongDraft,
    constants: &WorldConstants,
    rng: &mut R,
) -> Result<(u8, Decimal), SimError> {
    let tier = constants
        .production(draft.tier)
        .ok_or(SimError::UnknownTier(draft.tier))?;
    let range = tier.min_quality..=tier.max_quality;
    let quality = match draft.quality {
        Some(q) if range.contains(&q) => q,
        Some(q) => return Err(SimError::InvalidQuality(q)),
        None => rng.gen_range(range),
    };
    Ok((quality, tier.cost_usd))
}

fn new_player_song<R: Rng + ?Sized>(
    state: &mut GameState,
    draft: &SongDraft,
    kind: SongKind,
    quality: u8,
    rng: &mut R,
) -> Song {
    let id = SongId(state.allocate_id("song"));
    let mut song = Song::new(
        id,
        draft.title.clone(),
        ArtistRef::Player,
        draft.genre.clone(),
        kind,
        quality,
        state.clock.absolute_week(),
    );
    song.theme = draft.theme.clone();
    song.release_popularity = state.popularity_snapshot();
    if let Some(weeks) = roll_song_virality(quality, rng) {
        song.is_viral = true;
        song.viral_weeks_remaining = weeks;
        info!(song = %song.id.0, weeks, "song went viral on release");
    }
    song
}

/// A release lifts every region by `0.5 * quality / 100`.
fn release_buzz(state: &mut GameState, quality: f64) {
    let bump = 0.5 * quality / 100.0;
    for region in state.regions.iter_mut() {
        region.popularity = (region.popularity + bump).clamp(0.0, 100.0);
    }
}

/// Record and release a single. The release-time popularity snapshot is
/// taken before the release buzz is applied.
pub fn release_single<R: Rng + ?Sized>(
    state: &mut GameState,
    constants: &WorldConstants,
    draft: &SongDraft,
    rng: &mut R,
) -> Result<SongId, SimError> {
    let (quality, cost) = produce(draft, constants, rng)?;
    ensure_funds(state, cost)?;

    state.player.money -= cost;
    let song = new_player_song(state, draft, SongKind::Single, quality, rng);
    let id = song.id.clone();
    state.songs.push(song);
    release_buzz(state, quality as f64);
    info!(song = %id.0, quality, cost = %cost, "single released");
    Ok(id)
}

/// Record and release an album of catalog tracks.
pub fn release_album<R: Rng + ?Sized>(
    state: &mut GameState,
    constants: &WorldConstants,
    draft: &AlbumDraft,
    rng: &mut R,
) -> Result<AlbumId, SimError> {
    if draft.tracks.is_empty() {
        return Err(SimError::EmptyAlbum);
    }
    let mut produced = Vec::with_capacity(draft.tracks.len());
    let mut cost = Decimal::ZERO;
    for track in &draft.tracks {
        let (quality, track_cost) = produce(track, constants, rng)?;
        produced.push(quality);
        cost += track_cost;
    }
    ensure_funds(state, cost)?;

    state.player.money -= cost;
    let album_id = AlbumId(state.allocate_id("album"));
    let mut track_ids = Vec::with_capacity(produced.len());
    for (track, &quality) in draft.tracks.iter().zip(&produced) {
        let mut song = new_player_song(state, track, SongKind::Track, quality, rng);
        song.album_id = Some(album_id.clone());
        if song.theme.is_none() {
            song.theme = draft.theme.clone();
        }
        track_ids.push(song.id.clone());
        state.songs.push(song);
    }
    let quality = produced.iter().map(|&q| q as f64).sum::<f64>() / produced.len() as f64;
    state.albums.push(Album {
        id: album_id.clone(),
        title: draft.title.clone(),
        artist: ArtistRef::Player,
        track_ids,
        quality,
        release_week: state.clock.absolute_week(),
        theme: draft.theme.clone(),
        total_sales: 0,
        weekly_sales: 0,
        has_charted: false,
    });
    release_buzz(state, quality);
    info!(album = %album_id.0, tracks = produced.len(), cost = %cost, "album released");
    Ok(album_id)
}

/// Upload a video. Videos are free to make; monetization follows the
/// channel's lifetime views.
pub fn upload_video<R: Rng + ?Sized>(
    state: &mut GameState,
    draft: &VideoDraft,
    rng: &mut R,
) -> Result<VideoId, SimError> {
    for q in [
        draft.production_quality,
        draft.concept_quality,
        draft.thumbnail_quality,
    ] {
        if q > 100 {
            return Err(SimError::InvalidQuality(q));
        }
    }
    if let Some(song_id) = &draft.song_id {
        if state.song(song_id).is_none() {
            return Err(SimError::UnknownSong(song_id.0.clone()));
        }
    }

    let lifetime_views: u64 = state.videos.iter().map(|v| v.total_views).sum();
    let id = VideoId(state.allocate_id("video"));
    let mut video = YouTubeVideo {
        id: id.clone(),
        title: draft.title.clone(),
        song_id: draft.song_id.clone(),
        kind: draft.kind,
        production_quality: draft.production_quality,
        concept_quality: draft.concept_quality,
        thumbnail_quality: draft.thumbnail_quality,
        upload_week: state.clock.absolute_week(),
        is_viral: false,
        viral_weeks_remaining: 0,
        total_views: 0,
        weekly_views: 0,
        likes: 0,
        comments: 0,
        total_revenue: Decimal::ZERO,
        monetized: lifetime_views >= MONETIZATION_VIEWS,
    };
    if let Some(weeks) = roll_video_virality(draft.thumbnail_quality, draft.concept_quality, rng) {
        video.is_viral = true;
        video.viral_weeks_remaining = weeks;
    }
    info!(video = %id.0, kind = ?draft.kind, viral = video.is_viral, "video uploaded");
    state.videos.push(video);
    Ok(id)
}

/// Switch the paid promotion on one of the player's singles. Billing starts
/// with the next tick.
pub fn set_promo(
    state: &mut GameState,
    song_id: &SongId,
    strategy: PromoStrategy,
) -> Result<(), SimError> {
    let song = state
        .song_mut(song_id)
        .ok_or_else(|| SimError::UnknownSong(song_id.0.clone()))?;
    if !song.artist.is_player() || !song.is_single() {
        return Err(SimError::NotPromotable(song_id.0.clone()));
    }
    song.promo = strategy;
    info!(song = %song_id.0, ?strategy, "promo set");
    Ok(())
}

/// Pay for a marketing push in one region: +5 popularity, capped at 100.
pub fn run_region_campaign(state: &mut GameState, region: &RegionId) -> Result<f64, SimError> {
    let cost = Decimal::new(CAMPAIGN_COST_PER_POINT, 0)
        * Decimal::new(CAMPAIGN_BOOST as i64, 0);
    if state.region(region).is_none() {
        return Err(SimError::UnknownRegion(region.0.clone()));
    }
    ensure_funds(state, cost)?;
    state.player.money -= cost;
    let mut popularity = 0.0;
    if let Some(r) = state.regions.iter_mut().find(|r| &r.id == region) {
        r.popularity = (r.popularity + CAMPAIGN_BOOST).clamp(0.0, 100.0);
        popularity = r.popularity;
    }
    info!(region = %region, popularity, cost = %cost, "region campaign");
    Ok(popularity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_core::{seeded_rng, validate_state, GameClock, PlayerProfile};
    use std::collections::BTreeMap;

    fn state(money: i64) -> GameState {
        GameState {
            clock: GameClock::new(2025),
            player: PlayerProfile {
                name: "Me".into(),
                money: Decimal::new(money, 0),
                hype: 0.0,
                monthly_listeners: 0,
            },
            regions: WorldConstants::builtin().initial_regions(),
            songs: Vec::new(),
            albums: Vec::new(),
            videos: Vec::new(),
            npcs: Vec::new(),
            genre_trends: BTreeMap::new(),
            charts: BTreeMap::new(),
            next_id: 0,
        }
    }

    fn draft(quality: Option<u8>) -> SongDraft {
        SongDraft {
            title: "First Light".into(),
            genre: GenreId("pop".into()),
            theme: None,
            tier: ProductionTier::Studio,
            quality,
        }
    }

    #[test]
    fn single_snapshots_popularity_before_buzz() {
        let constants = WorldConstants::builtin();
        let mut s = state(100_000);
        let mut rng = seeded_rng(1);
        let id = release_single(&mut s, &constants, &draft(Some(80)), &mut rng).unwrap();
        let song = s.song(&id).unwrap();
        assert_eq!(song.kind, SongKind::Single);
        assert!(song.release_popularity.values().all(|&p| p == 5.0));
        assert!(s.regions.iter().all(|r| (r.popularity - 5.4).abs() < 1e-9));
        assert_eq!(s.player.money, Decimal::new(75_000, 0));
        assert!(validate_state(&s).is_ok());
    }

    #[test]
    fn rolled_quality_stays_in_tier() {
        let constants = WorldConstants::builtin();
        let mut s = state(10_000_000);
        let mut rng = seeded_rng(2);
        for _ in 0..50 {
            let id = release_single(&mut s, &constants, &draft(None), &mut rng).unwrap();
            let q = s.song(&id).unwrap().quality;
            assert!((60..=85).contains(&q));
        }
    }

    #[test]
    fn rejected_actions_leave_state_untouched() {
        let constants = WorldConstants::builtin();
        let mut s = state(1_000);
        let mut rng = seeded_rng(3);
        assert_eq!(
            release_single(&mut s, &constants, &draft(Some(70)), &mut rng),
            Err(SimError::InsufficientFunds {
                needed: Decimal::new(25_000, 0),
                available: Decimal::new(1_000, 0),
            })
        );
        assert_eq!(
            release_single(&mut s, &constants, &draft(Some(20)), &mut rng),
            Err(SimError::InvalidQuality(20))
        );
        let empty = AlbumDraft {
            title: "Nothing".into(),
            theme: None,
            tracks: vec![],
        };
        assert_eq!(
            release_album(&mut s, &constants, &empty, &mut rng),
            Err(SimError::EmptyAlbum)
        );
        assert!(s.songs.is_empty() && s.albums.is_empty());
        assert_eq!(s.player.money, Decimal::new(1_000, 0));
        assert_eq!(s.next_id, 0);
    }

    #[test]
    fn album_tracks_are_linked_catalog_tracks() {
        let constants = WorldConstants::builtin();
        let mut s = state(1_000_000);
        let mut rng = seeded_rng(4);
        let album = AlbumDraft {
            title: "Debut".into(),
            theme: Some("summer".into()),
            tracks: vec![draft(Some(60)), draft(Some(70)), draft(Some(80))],
        };
        let id = release_album(&mut s, &constants, &album, &mut rng).unwrap();
        let a = s.album(&id).unwrap();
        assert_eq!(a.track_ids.len(), 3);
        assert_eq!(a.quality, 70.0);
        assert!(s.songs.iter().all(|t| t.kind == SongKind::Track
            && t.album_id.as_ref() == Some(&id)
            && t.has_theme("summer")));
        assert_eq!(s.player.money, Decimal::new(925_000, 0));
        assert!(validate_state(&s).is_ok());
    }

    #[test]
    fn album_tracks_are_priced_per_tier() {
        let constants = WorldConstants::builtin();
        let mut s = state(200_000);
        let mut rng = seeded_rng(7);
        let album = AlbumDraft {
            title: "Mixed".into(),
            theme: None,
            tracks: vec![
                SongDraft {
                    tier: ProductionTier::Demo,
                    ..draft(Some(30))
                },
                SongDraft {
                    tier: ProductionTier::Premium,
                    ..draft(Some(90))
                },
            ],
        };
        release_album(&mut s, &constants, &album, &mut rng).unwrap();
        assert_eq!(s.player.money, Decimal::new(99_500, 0));
        assert_eq!(s.albums[0].quality, 60.0);
    }

    #[test]
    fn promo_only_on_player_singles() {
        let constants = WorldConstants::builtin();
        let mut s = state(1_000_000);
        let mut rng = seeded_rng(5);
        let single = release_single(&mut s, &constants, &draft(Some(70)), &mut rng).unwrap();
        set_promo(&mut s, &single, PromoStrategy::RadioCampaign).unwrap();
        assert_eq!(s.song(&single).unwrap().promo, PromoStrategy::RadioCampaign);

        let album = AlbumDraft {
            title: "LP".into(),
            theme: None,
            tracks: vec![draft(Some(70))],
        };
        release_album(&mut s, &constants, &album, &mut rng).unwrap();
        let track = s.albums[0].track_ids[0].clone();
        assert_eq!(
            set_promo(&mut s, &track, PromoStrategy::SocialMedia),
            Err(SimError::NotPromotable(track.0.clone()))
        );
        assert_eq!(
            set_promo(&mut s, &SongId("nope".into()), PromoStrategy::SocialMedia),
            Err(SimError::UnknownSong("nope".into()))
        );
    }

    #[test]
    fn campaign_costs_and_caps() {
        let mut s = state(120_000);
        s.regions[0].popularity = 98.0;
        let usa = s.regions[0].id.clone();
        assert_eq!(run_region_campaign(&mut s, &usa), Ok(100.0));
        assert_eq!(s.player.money, Decimal::new(70_000, 0));
        assert_eq!(
            run_region_campaign(&mut s, &RegionId("MARS".into())),
            Err(SimError::UnknownRegion("MARS".into()))
        );
        run_region_campaign(&mut s, &usa).unwrap();
        assert!(run_region_campaign(&mut s, &usa).is_err());
    }

    #[test]
    fn video_upload_checks_song_and_quality() {
        let mut s = state(0);
        let mut rng = seeded_rng(6);
        let bad = VideoDraft {
            title: "MV".into(),
            song_id: Some(SongId("ghost".into())),
            kind: VideoKind::OfficialMv,
            production_quality: 50,
            concept_quality: 50,
            thumbnail_quality: 50,
        };
        assert_eq!(
            upload_video(&mut s, &bad, &mut rng),
            Err(SimError::UnknownSong("ghost".into()))
        );
        let ok = VideoDraft {
            song_id: None,
            ..bad
        };
        let id = upload_video(&mut s, &ok, &mut rng).unwrap();
        assert!(!s.videos[0].monetized);
        assert_eq!(s.videos[0].id, id);
    }
}
