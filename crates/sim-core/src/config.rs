//! Static lookup tables (genres, regions, promo strategies, production tiers)
//! and simulation run parameters.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::model::{GenreId, PromoStrategy, RegionId, RegionStats};

/// Chart weight used for regions missing from the table.
pub const DEFAULT_CHART_WEIGHT: f64 = 0.7;

/// Per-genre tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenreProfile {
    pub id: GenreId,
    pub name: String,
    /// Base weekly retention in the legacy phase, in (0, 1).
    pub longevity: f64,
    /// Relative streaming appetite for the genre (1.0 = neutral).
    pub stream_bias: f64,
}

/// Per-region tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegionProfile {
    pub id: RegionId,
    pub name: String,
    pub market_size: f64,
    pub chart_weight: f64,
    #[serde(default)]
    pub starting_popularity: f64,
}

/// Multiplier and weekly cost of a promo strategy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PromoProfile {
    pub strategy: PromoStrategy,
    pub multiplier: f64,
    pub weekly_cost_usd: Decimal,
}

/// Recording budget classes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ProductionTier {
    Demo,
    Indie,
    Studio,
    Premium,
}

/// Quality range and cost of a production tier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductionProfile {
    pub tier: ProductionTier,
    pub min_quality: u8,
    pub max_quality: u8,
    pub cost_usd: Decimal,
}

/// World lookup tables consumed by the engine.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConstants {
    pub genres: Vec<GenreProfile>,
    pub regions: Vec<RegionProfile>,
    pub promos: Vec<PromoProfile>,
    pub production_tiers: Vec<ProductionProfile>,
    /// Payout per stream in USD.
    pub stream_payout_usd: f64,
    /// Price per sale in USD.
    pub sale_price_usd: f64,
}

fn genre(id: &str, name: &str, longevity: f64, stream_bias: f64) -> GenreProfile {
    GenreProfile {
        id: GenreId(id.to_string()),
        name: name.to_string(),
        longevity,
        stream_bias,
    }
}

fn region(id: &str, name: &str, market_size: f64, chart_weight: f64) -> RegionProfile {
    RegionProfile {
        id: RegionId(id.to_string()),
        name: name.to_string(),
        market_size,
        chart_weight,
        starting_popularity: 5.0,
    }
}

fn promo(strategy: PromoStrategy, multiplier: f64, weekly_cost: i64) -> PromoProfile {
    PromoProfile {
        strategy,
        multiplier,
        weekly_cost_usd: Decimal::new(weekly_cost, 0),
    }
}

fn tier(tier: ProductionTier, min_quality: u8, max_quality: u8, cost: i64) -> ProductionProfile {
    ProductionProfile {
        tier,
        min_quality,
        max_quality,
        cost_usd: Decimal::new(cost, 0),
    }
}

impl Default for WorldConstants {
    fn default() -> Self {
        Self {
            genres: vec![
                genre("pop", "Pop", 0.90, 1.2),
                genre("hip-hop", "Hip-Hop", 0.88, 1.25),
                genre("rnb", "R&B", 0.92, 1.0),
                genre("rock", "Rock", 0.95, 0.85),
                genre("electronic", "Electronic", 0.87, 1.0),
                genre("country", "Country", 0.94, 0.9),
                genre("latin", "Latin", 0.89, 1.1),
                genre("kpop", "K-Pop", 0.86, 1.15),
                genre("indie", "Indie", 0.96, 0.7),
            ],
            regions: vec![
                region("USA", "United States", 100.0, 1.0),
                region("UK", "United Kingdom", 40.0, 0.85),
                region("EUROPE", "Europe", 80.0, 0.8),
                region("ASIA", "Asia", 90.0, 0.75),
                region("LATAM", "Latin America", 50.0, 0.7),
                region("AFRICA", "Africa", 25.0, 0.6),
                region("OCEANIA", "Oceania", 15.0, 0.65),
            ],
            promos: vec![
                promo(PromoStrategy::None, 1.0, 0),
                promo(PromoStrategy::SocialMedia, 1.15, 500),
                promo(PromoStrategy::PlaylistPitch, 1.35, 2_000),
                promo(PromoStrategy::RadioCampaign, 1.6, 8_000),
                promo(PromoStrategy::ViralMarketing, 1.9, 20_000),
            ],
            production_tiers: vec![
                tier(ProductionTier::Demo, 20, 45, 500),
                tier(ProductionTier::Indie, 40, 65, 5_000),
                tier(ProductionTier::Studio, 60, 85, 25_000),
                tier(ProductionTier::Premium, 75, 100, 100_000),
            ],
            stream_payout_usd: 0.004,
            sale_price_usd: 0.99,
        }
    }
}

/// Errors raised while loading constants from disk.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read world constants from {path:?}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse world constants: {0}")]
    Parse(#[from] serde_yaml::Error),
}

impl WorldConstants {
    /// Builtin tables used when no override file is given.
    pub fn builtin() -> Self {
        Self::default()
    }

    /// Parse YAML; missing top-level keys keep their builtin values.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&contents)
    }

    pub fn genre(&self, id: &GenreId) -> Option<&GenreProfile> {
        self.genres.iter().find(|g| &g.id == id)
    }

    /// Legacy retention for a genre; unknown genres get a middling 0.9.
    pub fn genre_longevity(&self, id: &GenreId) -> f64 {
        self.genre(id).map(|g| g.longevity).unwrap_or(0.9)
    }

    /// Streaming appetite for a genre; unknown genres are neutral.
    pub fn genre_stream_bias(&self, id: &GenreId) -> f64 {
        self.genre(id).map(|g| g.stream_bias).unwrap_or(1.0)
    }

    /// Chart weight for a region, [`DEFAULT_CHART_WEIGHT`] if unlisted.
    pub fn chart_weight(&self, id: &RegionId) -> f64 {
        self.regions
            .iter()
            .find(|r| &r.id == id)
            .map(|r| r.chart_weight)
            .unwrap_or(DEFAULT_CHART_WEIGHT)
    }

    pub fn promo(&self, strategy: PromoStrategy) -> Option<&PromoProfile> {
        self.promos.iter().find(|p| p.strategy == strategy)
    }

    /// Stream multiplier for a promo strategy; 1.0 if unlisted.
    pub fn promo_multiplier(&self, strategy: PromoStrategy) -> f64 {
        self.promo(strategy).map(|p| p.multiplier).unwrap_or(1.0)
    }

    pub fn promo_cost(&self, strategy: PromoStrategy) -> Decimal {
        self.promo(strategy)
            .map(|p| p.weekly_cost_usd)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn production(&self, tier: ProductionTier) -> Option<&ProductionProfile> {
        self.production_tiers.iter().find(|p| p.tier == tier)
    }

    /// Fresh region state for a new career.
    pub fn initial_regions(&self) -> Vec<RegionStats> {
        self.regions
            .iter()
            .map(|r| RegionStats {
                id: r.id.clone(),
                name: r.name.clone(),
                popularity: r.starting_popularity.clamp(0.0, 100.0),
                market_size: r.market_size,
            })
            .collect()
    }
}

/// Simulation run parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Seed for deterministic RNG.
    pub rng_seed: u64,
    /// Wall-clock seconds that make up one game week during catch-up.
    pub real_seconds_per_week: u64,
    /// Upper bound on weeks simulated by a single catch-up.
    pub max_catch_up_weeks: u32,
    /// Pad song charts with fillers up to 100 entries.
    pub pad_song_charts: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            rng_seed: 42,
            real_seconds_per_week: 300,
            max_catch_up_weeks: 52,
            pad_song_charts: false,
        }
    }
}
