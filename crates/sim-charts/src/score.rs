//! Chart-specific scoring for songs and albums.

use sim_core::hashing::{hash_pair, unit_from_hash};
use sim_core::{Album, RegionId, RegionStats, Song, WorldConstants};

pub const STREAM_WEIGHT: f64 = 0.65;
pub const SALES_WEIGHT: f64 = 0.35;
/// One download counts as this many chart units.
pub const SALE_UNITS: f64 = 12.0;
/// Share of worldwide figures assumed for the USA when a song has no USA row.
pub const MISSING_USA_SHARE: f64 = 0.2;
/// Album sales per chart point.
pub const ALBUM_SALES_PER_POINT: f64 = 100.0;
pub const ALBUM_VARIANCE_MIN: f64 = 0.8;
pub const ALBUM_VARIANCE_MAX: f64 = 1.2;

/// A score plus the two metrics shown next to it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scored {
    pub score: f64,
    pub metric_primary: u64,
    pub metric_secondary: u64,
}

/// Chart points for one region's streams and sales.
///
/// Example:
/// assert_eq!(song_points(1_000.0, 0.0), 0.65);
pub fn song_points(streams: f64, sales: f64) -> f64 {
    streams / 1000.0 * STREAM_WEIGHT + sales * SALE_UNITS * SALES_WEIGHT
}

/// HOT_100: USA only, floored. Songs without a USA row use 20% of their
/// worldwide figures.
pub fn hot100_score(song: &Song) -> Scored {
    let (streams, sales) = match song.regional.get(&RegionId::usa()) {
        Some(usa) => (usa.weekly_streams as f64, usa.weekly_sales as f64),
        None => (
            song.weekly_streams as f64 * MISSING_USA_SHARE,
            song.weekly_sales as f64 * MISSING_USA_SHARE,
        ),
    };
    Scored {
        score: song_points(streams, sales).floor(),
        metric_primary: streams.floor() as u64,
        metric_secondary: sales.floor() as u64,
    }
}

/// GLOBAL_200: every region's points weighted by its chart weight.
pub fn global_song_score(song: &Song, constants: &WorldConstants) -> Scored {
    let score: f64 = song
        .regional
        .iter()
        .map(|(region, perf)| {
            song_points(perf.weekly_streams as f64, perf.weekly_sales as f64)
                * constants.chart_weight(region)
        })
        .sum();
    Scored {
        score,
        metric_primary: song.weekly_streams,
        metric_secondary: song.weekly_sales,
    }
}

/// Single-region song chart.
pub fn region_song_score(song: &Song, region: &RegionId) -> Scored {
    let (streams, sales) = song
        .regional
        .get(region)
        .map(|r| (r.weekly_streams, r.weekly_sales))
        .unwrap_or((0, 0));
    Scored {
        score: song_points(streams as f64, sales as f64),
        metric_primary: streams,
        metric_secondary: sales,
    }
}

/// Deterministic per-(album, region) variance in [0.8, 1.2].
pub fn album_region_variance(album: &str, region: &str) -> f64 {
    let u = unit_from_hash(hash_pair(album, region));
    ALBUM_VARIANCE_MIN + (ALBUM_VARIANCE_MAX - ALBUM_VARIANCE_MIN) * u
}

/// Sum of market sizes; the denominator for regional sales shares.
pub fn total_market(regions: &[RegionStats]) -> f64 {
    regions.iter().map(|r| r.market_size.max(0.0)).sum()
}

fn market_share(region: &RegionStats, total_market: f64) -> f64 {
    if total_market > 0.0 {
        region.market_size.max(0.0) / total_market
    } else {
        0.0
    }
}

/// Estimated weekly album sales in one region: market share of the album's
/// weekly sales, scaled by the album/region variance.
pub fn album_region_sales(album: &Album, region: &RegionStats, total_market: f64) -> f64 {
    album.weekly_sales as f64
        * market_share(region, total_market)
        * album_region_variance(&album.id.0, &region.id.0)
}

/// GLOBAL_ALBUMS: market-share split of weekly sales, weighted per region.
pub fn global_album_score(
    album: &Album,
    regions: &[RegionStats],
    constants: &WorldConstants,
) -> Scored {
    let total = total_market(regions);
    let score: f64 = regions
        .iter()
        .map(|r| {
            album.weekly_sales as f64 * market_share(r, total) / ALBUM_SALES_PER_POINT
                * constants.chart_weight(&r.id)
        })
        .sum();
    Scored {
        score,
        metric_primary: album.weekly_sales,
        metric_secondary: album.track_ids.len() as u64,
    }
}

/// Single-region album chart.
pub fn region_album_score(album: &Album, region: &RegionStats, total_market: f64) -> Scored {
    let sales = album_region_sales(album, region, total_market);
    Scored {
        score: sales / ALBUM_SALES_PER_POINT,
        metric_primary: sales.floor() as u64,
        metric_secondary: album.track_ids.len() as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use sim_core::{AlbumId, ArtistRef, GenreId, RegionalPerformance, SongId, SongKind};

    fn song() -> Song {
        Song::new(
            SongId("song-1".into()),
            "Hit",
            ArtistRef::Player,
            GenreId("pop".into()),
            SongKind::Single,
            80,
            1,
        )
    }

    fn perf(streams: u64, sales: u64) -> RegionalPerformance {
        RegionalPerformance {
            weekly_streams: streams,
            weekly_sales: sales,
            total_streams: streams,
            total_sales: sales,
        }
    }

    fn album(sales: u64) -> Album {
        Album {
            id: AlbumId("album-1".into()),
            title: "LP".into(),
            artist: ArtistRef::Player,
            track_ids: vec![SongId("a".into()), SongId("b".into())],
            quality: 70.0,
            release_week: 1,
            theme: None,
            total_sales: sales,
            weekly_sales: sales,
            has_charted: false,
        }
    }

    #[test]
    fn hot100_uses_usa_row() {
        let mut s = song();
        s.regional.insert(RegionId::usa(), perf(100_000, 300));
        // 100 * 0.65 + 300 * 12 * 0.35 = 65 + 1260
        assert_eq!(hot100_score(&s).score, 1325.0);
        assert_eq!(hot100_score(&s).metric_primary, 100_000);
    }

    #[test]
    fn hot100_falls_back_to_a_fifth_of_worldwide() {
        let mut s = song();
        s.weekly_streams = 500_000;
        s.weekly_sales = 1_000;
        // 100_000 / 1000 * 0.65 + 200 * 12 * 0.35 = 65 + 840
        assert_eq!(hot100_score(&s).score, 905.0);
    }

    #[test]
    fn global_score_weights_regions() {
        let constants = WorldConstants::builtin();
        let mut s = song();
        s.regional.insert(RegionId::usa(), perf(1_000_000, 0));
        s.regional.insert(RegionId("UK".into()), perf(1_000_000, 0));
        s.regional.insert(RegionId("MARS".into()), perf(1_000_000, 0));
        let got = global_song_score(&s, &constants).score;
        assert!((got - 650.0 * (1.0 + 0.85 + 0.7)).abs() < 1e-9);
    }

    #[test]
    fn region_score_is_zero_without_data() {
        assert_eq!(region_song_score(&song(), &RegionId::usa()).score, 0.0);
    }

    #[test]
    fn regional_album_sales_follow_market_share() {
        let regions = WorldConstants::builtin().initial_regions();
        let total = total_market(&regions);
        let a = album(40_000);
        let split: f64 = regions
            .iter()
            .map(|r| album_region_sales(&a, r, total))
            .sum();
        assert!(split >= 40_000.0 * 0.8 - 1e-6 && split <= 40_000.0 * 1.2 + 1e-6);
        assert_eq!(region_album_score(&a, &regions[0], 0.0).score, 0.0);
    }

    #[test]
    fn global_album_score_without_regions_is_zero() {
        let constants = WorldConstants::builtin();
        assert_eq!(global_album_score(&album(10_000), &[], &constants).score, 0.0);
    }

    proptest! {
        #[test]
        fn album_variance_is_bounded_and_stable(a in "[a-z0-9-]{1,16}", r in "[A-Z]{2,8}") {
            let v = album_region_variance(&a, &r);
            prop_assert!((ALBUM_VARIANCE_MIN..ALBUM_VARIANCE_MAX).contains(&v));
            prop_assert_eq!(v, album_region_variance(&a, &r));
        }
    }
}
