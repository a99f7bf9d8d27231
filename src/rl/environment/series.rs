//! Price Series
//!
//! Validated close-price series and a seeded synthetic generator.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{QtradeError, Result};

/// Floor for generated prices
const MIN_PRICE: f64 = 0.01;

/// Immutable series of close prices
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    prices: Vec<f64>,
}

impl PriceSeries {
    /// Create a series; every price must be finite and strictly positive
    pub fn new(prices: Vec<f64>) -> Result<Self> {
        if prices.is_empty() {
            return Err(QtradeError::Validation(
                "price series is empty".to_string(),
            ));
        }

        if let Some((idx, price)) = prices
            .iter()
            .enumerate()
            .find(|(_, p)| !p.is_finite() || **p <= 0.0)
        {
            return Err(QtradeError::Validation(format!(
                "price at index {idx} must be finite and positive, got {price}"
            )));
        }

        Ok(Self { prices })
    }

    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.prices
    }
}

/// Synthetic series configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticSeriesConfig {
    /// Number of prices to generate
    pub length: usize,
    /// First price of the series
    pub initial_price: f64,
    /// Std dev of per-tick returns
    pub volatility: f64,
    /// Mean per-tick return
    pub drift: f64,
    /// RNG seed
    pub seed: u64,
}

impl Default for SyntheticSeriesConfig {
    fn default() -> Self {
        Self {
            length: 250,
            initial_price: 100.0,
            volatility: 0.02,
            drift: 0.0,
            seed: 42,
        }
    }
}

/// Generate a geometric random walk; identical seeds give identical series
pub fn generate_synthetic_prices(config: &SyntheticSeriesConfig) -> Result<PriceSeries> {
    if config.length == 0 {
        return Err(QtradeError::Validation(
            "synthetic series length must be at least 1".to_string(),
        ));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut prices = Vec::with_capacity(config.length);
    let mut price = config.initial_price;
    prices.push(price);

    for _ in 1..config.length {
        let ret = config.drift + sample_normal(&mut rng) * config.volatility;
        price = (price * (1.0 + ret)).max(MIN_PRICE);
        prices.push(price);
    }

    PriceSeries::new(prices)
}

/// Standard normal sample (Box-Muller transform)
fn sample_normal(rng: &mut StdRng) -> f64 {
    let u1: f64 = rng.gen_range(0.0001..1.0);
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}
