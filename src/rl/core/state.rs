//! State Representation
//!
//! Converts a sliding window of raw price signal into the discrete state
//! tuple used as the action-value table key.
//!
//! # Features
//!
//! - **trend**: latest close above the window's simple moving average
//! - **rsi_zone**: oversold (`1`), overbought (`-1`) or neutral (`0`)
//! - **momentum**: latest close above the first close of the window
//! - **volatility**: population std-dev of closes, rounded to 2 decimals
//! - **change**: most recent price delta above the oldest delta of the window
//!
//! A window of one sample is a known boundary: momentum and change both
//! compare a sample with itself and resolve to `0`.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::error::{QtradeError, Result};

/// Denominator substituted for the average loss when a window has no losses
pub const RSI_EPSILON: f64 = 1e-6;

/// RSI below this is oversold
pub const RSI_OVERSOLD: f64 = 30.0;

/// RSI above this is overbought
pub const RSI_OVERBOUGHT: f64 = 70.0;

/// One tick of raw signal: close price and change versus the previous tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalFeature {
    pub price: f64,
    pub diff: f64,
}

impl SignalFeature {
    pub fn new(price: f64, diff: f64) -> Self {
        Self { price, diff }
    }
}

/// Discrete state used as an exact-match table key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiscreteState {
    /// 1 if latest close > SMA of the window
    pub trend: u8,
    /// 1 oversold, -1 overbought, 0 neutral
    pub rsi_zone: i8,
    /// 1 if latest close > first close of the window
    pub momentum: u8,
    /// Std-dev of window closes, rounded to 2 decimals
    pub volatility: OrderedFloat<f64>,
    /// 1 if most recent delta > oldest delta of the window
    pub change: u8,
}

impl DiscreteState {
    pub fn new(trend: u8, rsi_zone: i8, momentum: u8, volatility: f64, change: u8) -> Self {
        Self {
            trend,
            rsi_zone,
            momentum,
            volatility: OrderedFloat(volatility),
            change,
        }
    }

    pub fn is_oversold(&self) -> bool {
        self.rsi_zone == 1
    }

    pub fn is_overbought(&self) -> bool {
        self.rsi_zone == -1
    }

    pub fn has_momentum(&self) -> bool {
        self.momentum == 1
    }
}

impl std::fmt::Display for DiscreteState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({}, {}, {}, {:.2}, {})",
            self.trend, self.rsi_zone, self.momentum, self.volatility.0, self.change
        )
    }
}

/// Trait for turning an observation window into a discrete state
pub trait StateExtractor: Send + Sync {
    /// Extract the state from a window ordered oldest first
    fn extract(&self, window: &[SignalFeature]) -> Result<DiscreteState>;
}

/// Indicator-based extractor (SMA, RSI, momentum, volatility, delta change)
#[derive(Debug, Clone, Copy, Default)]
pub struct IndicatorExtractor;

impl IndicatorExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl StateExtractor for IndicatorExtractor {
    fn extract(&self, window: &[SignalFeature]) -> Result<DiscreteState> {
        let (first, last) = match (window.first(), window.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => {
                return Err(QtradeError::InvalidState(
                    "cannot extract indicators from an empty window".to_string(),
                ))
            }
        };

        let prices: Vec<f64> = window.iter().map(|f| f.price).collect();
        let diffs: Vec<f64> = window.iter().map(|f| f.diff).collect();

        let trend = u8::from(last.price > mean(&prices));
        let rsi_zone = rsi_zone(rsi(&diffs));
        let momentum = u8::from(last.price - first.price > 0.0);
        let volatility = round_to_cents(std_dev(&prices));
        let change = u8::from(last.diff - first.diff > 0.0);

        Ok(DiscreteState::new(trend, rsi_zone, momentum, volatility, change))
    }
}

/// Relative Strength Index over a series of price deltas
///
/// With no losing deltas the average loss is replaced by [`RSI_EPSILON`],
/// which saturates the index near 100 (or yields 0 when there are no gains
/// either).
pub fn rsi(diffs: &[f64]) -> f64 {
    let gains: Vec<f64> = diffs.iter().copied().filter(|d| *d > 0.0).collect();
    let losses: Vec<f64> = diffs.iter().filter(|d| **d < 0.0).map(|d| -d).collect();

    let avg_gain = if gains.is_empty() { 0.0 } else { mean(&gains) };
    let avg_loss = if losses.is_empty() {
        RSI_EPSILON
    } else {
        mean(&losses)
    };

    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}

/// Map an RSI value onto its zone
pub fn rsi_zone(rsi: f64) -> i8 {
    if rsi < RSI_OVERSOLD {
        1
    } else if rsi > RSI_OVERBOUGHT {
        -1
    } else {
        0
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation
fn std_dev(values: &[f64]) -> f64 {
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

// Ties round to even.
fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(prices: &[f64], diffs: &[f64]) -> Vec<SignalFeature> {
        prices
            .iter()
            .zip(diffs)
            .map(|(p, d)| SignalFeature::new(*p, *d))
            .collect()
    }

    #[test]
    fn test_extract_uptrend() {
        let w = window(&[11.0, 12.0], &[1.0, 1.0]);
        let state = IndicatorExtractor::new().extract(&w).unwrap();

        assert_eq!(state, DiscreteState::new(1, -1, 1, 0.5, 0));
        assert!(state.is_overbought());
    }

    #[test]
    fn test_extract_mixed_window() {
        let w = window(&[11.0, 13.0], &[-1.0, 2.0]);
        let state = IndicatorExtractor::new().extract(&w).unwrap();

        // gains 2 / losses 1 => RSI 66.7 (neutral)
        assert_eq!(state, DiscreteState::new(1, 0, 1, 1.0, 1));
    }

    #[test]
    fn test_extract_downtrend_is_oversold() {
        let w = window(&[10.0, 9.0, 8.0], &[-1.0, -1.0, -1.0]);
        let state = IndicatorExtractor::new().extract(&w).unwrap();

        assert_eq!(state.trend, 0);
        assert_eq!(state.rsi_zone, 1);
        assert_eq!(state.momentum, 0);
        assert_eq!(state.change, 0);
    }

    #[test]
    fn test_rsi_no_losses_uses_epsilon() {
        let value = rsi(&[0.5, 1.0, 0.0]);
        assert!(value.is_finite());
        assert!(value > 99.99);
        assert_eq!(rsi_zone(value), -1);
    }

    #[test]
    fn test_rsi_flat_window_is_zero() {
        let value = rsi(&[0.0, 0.0, 0.0]);
        assert_eq!(value, 0.0);
        assert_eq!(rsi_zone(value), 1);
    }

    #[test]
    fn test_rsi_balanced() {
        assert!((rsi(&[1.0, -1.0]) - 50.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_sample_window() {
        let w = window(&[42.0], &[3.0]);
        let state = IndicatorExtractor::new().extract(&w).unwrap();

        assert_eq!(state.momentum, 0);
        assert_eq!(state.change, 0);
        assert_eq!(state.trend, 0);
        assert_eq!(state.volatility, OrderedFloat(0.0));
    }

    #[test]
    fn test_volatility_rounding() {
        assert_eq!(round_to_cents(0.4714045207910317), 0.47);
        assert_eq!(round_to_cents(1.0), 1.0);
        // 0.125 is exact in binary, so ties go to even
        assert_eq!(round_to_cents(0.125), 0.12);
    }

    #[test]
    fn test_empty_window_is_rejected() {
        let err = IndicatorExtractor::new().extract(&[]).unwrap_err();
        assert!(matches!(err, QtradeError::InvalidState(_)));
    }

    #[test]
    fn test_display() {
        let state = DiscreteState::new(1, -1, 0, 0.5, 1);
        assert_eq!(state.to_string(), "(1, -1, 0, 0.50, 1)");
    }
}
