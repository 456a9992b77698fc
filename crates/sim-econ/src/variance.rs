//! Per-song weekly randomness.
//!
//! Singles get a narrow band that tightens and lifts with quality. Catalog
//! tracks roll one of three outcomes from a single draw split into cumulative
//! bands, checked in the fixed order sleeper hit, flop, standard.

use rand::Rng;
use sim_core::SongKind;

/// Lowest multiplier the variance system ever returns.
pub const VARIANCE_FLOOR: f64 = 0.05;

/// Outcome bucket for a catalog track.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CatalogBranch {
    SleeperHit,
    Flop,
    Standard,
}

fn unit_quality(quality: f64) -> f64 {
    quality.clamp(0.0, 100.0) / 100.0
}

/// Band `[low, high)` for a single of the given quality.
pub fn single_band(quality: f64) -> (f64, f64) {
    let q = unit_quality(quality);
    (0.7 + 0.3 * q, 1.1 + 0.2 * q)
}

/// Single variance for a unit draw `u` in [0, 1).
pub fn single_variance_from_draw(quality: f64, u: f64) -> f64 {
    let (low, high) = single_band(quality);
    (low + (high - low) * u).max(VARIANCE_FLOOR)
}

/// Probability of the sleeper-hit bucket: `0.02 + max(0, (q - 80) / 100)`.
pub fn sleeper_chance(quality: f64) -> f64 {
    0.02 + ((quality.clamp(0.0, 100.0) - 80.0) / 100.0).max(0.0)
}

/// Probability of the flop bucket: `max(0.1, 0.4 - 0.3 q/100)`.
pub fn flop_chance(quality: f64) -> f64 {
    (0.4 - 0.3 * unit_quality(quality)).max(0.1)
}

/// Pick the bucket for a unit draw. Sleeper is checked first, then flop.
pub fn catalog_branch(quality: f64, bucket_draw: f64) -> CatalogBranch {
    let sleeper = sleeper_chance(quality);
    if bucket_draw < sleeper {
        CatalogBranch::SleeperHit
    } else if bucket_draw < sleeper + flop_chance(quality) {
        CatalogBranch::Flop
    } else {
        CatalogBranch::Standard
    }
}

/// Catalog variance from a bucket draw and a spread draw, both in [0, 1).
pub fn catalog_variance_from_draws(
    quality: f64,
    bucket_draw: f64,
    spread_draw: f64,
) -> (CatalogBranch, f64) {
    let q = unit_quality(quality);
    let branch = catalog_branch(quality, bucket_draw);
    let value = match branch {
        CatalogBranch::SleeperHit => 2.0 + 2.0 * spread_draw + q,
        CatalogBranch::Flop => 0.1 + 0.3 * spread_draw,
        CatalogBranch::Standard => 0.4 + 0.4 * spread_draw + 0.4 * q,
    };
    (branch, value.max(VARIANCE_FLOOR))
}

/// Roll this week's variance multiplier for a song.
///
/// Example:
/// let mut rng = sim_core::seeded_rng(7);
/// let v = compute_variance(SongKind::Single, 80, &mut rng);
/// assert!(v >= 0.94 && v < 1.26);
pub fn compute_variance<R: Rng + ?Sized>(kind: SongKind, quality: u8, rng: &mut R) -> f64 {
    let q = quality as f64;
    match kind {
        SongKind::Single => single_variance_from_draw(q, rng.gen::<f64>()),
        SongKind::Track => {
            let bucket: f64 = rng.gen();
            let spread: f64 = rng.gen();
            catalog_variance_from_draws(q, bucket, spread).1
        }
    }
}
