//! Weekly Performance Calculator for songs.
//!
//! Composes promo, fanbase, lifecycle, trend, region power and variance into
//! one week of streams, sales and revenue. Must run once per song per
//! simulated week, in order: lifecycle age and the variance roll are
//! per-week state and are never batched.

use rand::Rng;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use sim_core::{GenreId, RegionId, RegionStats, Song, WorldConstants};
use std::collections::{BTreeMap, BTreeSet};

use crate::lifecycle::{compute_lifecycle, Lifecycle};
use crate::profile::kind_profile;
use crate::region::{song_region_power, FameSource};
use crate::trend::compute_trend;
use crate::variance::compute_variance;

/// Weekly streams for a quality-100 song at full power in a size-100 market.
pub const BASE_WEEKLY_STREAMS: f64 = 250_000.0;
/// Downloads per stream.
pub const SALES_PER_STREAM: f64 = 0.003;
/// Stream multiplier while a song's viral countdown runs.
pub const SONG_VIRAL_MULTIPLIER: f64 = 2.5;
/// Virality gate threshold for songs at release.
pub const SONG_VIRAL_THRESHOLD: f64 = 85.0;

/// World inputs shared by every song this week.
#[derive(Clone, Copy, Debug)]
pub struct WeekContext<'a> {
    pub absolute_week: u32,
    pub month: u32,
    pub active_themes: &'a BTreeSet<&'static str>,
    pub genre_trends: &'a BTreeMap<GenreId, f64>,
    pub constants: &'a WorldConstants,
}

/// The releasing artist's standing this week.
#[derive(Clone, Copy, Debug)]
pub struct ArtistContext {
    pub monthly_listeners: u64,
    pub fame: FameSource,
}

/// One week of results for one song, before it is folded into the song.
#[derive(Clone, Debug, PartialEq)]
pub struct SongWeek {
    pub weekly_streams: u64,
    pub weekly_sales: u64,
    pub revenue: Decimal,
    pub hype_delta: f64,
    pub lifecycle: Lifecycle,
    pub trend: f64,
    pub variance: f64,
    /// `(streams, sales)` per region; every region appears, zero or not.
    pub regional: BTreeMap<RegionId, (u64, u64)>,
}

/// Fanbase multiplier stepped at 1M / 10M / 50M monthly listeners.
pub fn fanbase_multiplier(monthly_listeners: u64) -> f64 {
    match monthly_listeners {
        0..=999_999 => 0.8,
        1_000_000..=9_999_999 => 1.0,
        10_000_000..=49_999_999 => 1.25,
        _ => 1.6,
    }
}

/// Promo multiplier; catalog tracks are never promoted.
pub fn promo_multiplier(song: &Song, constants: &WorldConstants) -> f64 {
    if kind_profile(song.kind).promotable {
        constants.promo_multiplier(song.promo)
    } else {
        1.0
    }
}

/// Quality and genre driven stream base before multipliers.
pub fn base_streams(song: &Song, constants: &WorldConstants) -> f64 {
    let q = song.quality as f64 / 100.0;
    BASE_WEEKLY_STREAMS * q * q * constants.genre_stream_bias(&song.genre)
}

/// Revenue for a week of streams and sales, kept at full precision.
pub fn revenue_for(streams: u64, sales: u64, constants: &WorldConstants) -> Decimal {
    let payout = Decimal::from_f64(constants.stream_payout_usd.max(0.0)).unwrap_or(Decimal::ZERO);
    let price = Decimal::from_f64(constants.sale_price_usd.max(0.0)).unwrap_or(Decimal::ZERO);
    Decimal::from(streams) * payout + Decimal::from(sales) * price
}

/// Compute one week for a song without mutating it.
pub fn compute_song_week<R: Rng + ?Sized>(
    song: &Song,
    ctx: &WeekContext<'_>,
    artist: &ArtistContext,
    regions: &[RegionStats],
    rng: &mut R,
) -> SongWeek {
    let age = song.age_at(ctx.absolute_week);
    let longevity = ctx.constants.genre_longevity(&song.genre);
    let lifecycle = compute_lifecycle(age, song, ctx.month, longevity);
    let trend = compute_trend(song, ctx.genre_trends, ctx.active_themes);
    let variance = compute_variance(song.kind, song.quality, rng);
    let viral = if song.viral_active() {
        SONG_VIRAL_MULTIPLIER
    } else {
        1.0
    };

    let multiplier = promo_multiplier(song, ctx.constants)
        * fanbase_multiplier(artist.monthly_listeners)
        * lifecycle.multiplier
        * trend
        * variance
        * viral;
    let base = base_streams(song, ctx.constants);

    let mut regional = BTreeMap::new();
    let mut weekly_streams = 0u64;
    let mut weekly_sales = 0u64;
    for region in regions {
        let power = song_region_power(song, region, artist.fame).clamp(0.0, 100.0);
        let raw = base * multiplier * (power / 100.0) * (region.market_size / 100.0);
        let streams = if raw.is_finite() && raw > 0.0 {
            raw.floor() as u64
        } else {
            0
        };
        let sales = (streams as f64 * SALES_PER_STREAM).floor() as u64;
        weekly_streams = weekly_streams.saturating_add(streams);
        weekly_sales = weekly_sales.saturating_add(sales);
        regional.insert(region.id.clone(), (streams, sales));
    }

    SongWeek {
        weekly_streams,
        weekly_sales,
        revenue: revenue_for(weekly_streams, weekly_sales, ctx.constants),
        hype_delta: lifecycle.hype_impact * weekly_streams as f64 / 1_000_000.0,
        lifecycle,
        trend,
        variance,
        regional,
    }
}

/// Fold a computed week into the song's running totals and tick its viral
/// countdown.
pub fn apply_song_week(song: &mut Song, week: &SongWeek) {
    song.weekly_streams = week.weekly_streams;
    song.weekly_sales = week.weekly_sales;
    song.total_streams = song.total_streams.saturating_add(week.weekly_streams);
    song.total_sales = song.total_sales.saturating_add(week.weekly_sales);
    song.total_revenue += week.revenue;
    for (region, &(streams, sales)) in &week.regional {
        let entry = song.regional.entry(region.clone()).or_default();
        entry.weekly_streams = streams;
        entry.weekly_sales = sales;
        entry.total_streams = entry.total_streams.saturating_add(streams);
        entry.total_sales = entry.total_sales.saturating_add(sales);
    }
    song.peak_weekly_streams = song.peak_weekly_streams.max(week.weekly_streams);
    if song.viral_active() {
        song.viral_weeks_remaining -= 1;
    }
    if song.viral_weeks_remaining == 0 {
        song.is_viral = false;
    }
}

/// Compute and apply one week for a song.
pub fn simulate_song_week<R: Rng + ?Sized>(
    song: &mut Song,
    ctx: &WeekContext<'_>,
    artist: &ArtistContext,
    regions: &[RegionStats],
    rng: &mut R,
) -> SongWeek {
    let week = compute_song_week(song, ctx, artist, regions, rng);
    apply_song_week(song, &week);
    week
}

/// Release-time virality score for a song: `0.5 q + 50 u`.
pub fn song_virality_score_from_draw(quality: u8, u: f64) -> f64 {
    0.5 * quality as f64 + 50.0 * u
}

/// One-time virality gate at release. Returns the countdown when viral.
pub fn roll_song_virality<R: Rng + ?Sized>(quality: u8, rng: &mut R) -> Option<u32> {
    let score = song_virality_score_from_draw(quality, rng.gen());
    if score > SONG_VIRAL_THRESHOLD {
        Some(crate::video::viral_duration_from_draw(rng.gen()))
    } else {
        None
    }
}
