//! Stock Trading Engine
//!
//! Replays a historical close-price series one tick at a time while holding a
//! single Long or Short position. Charges a bid/ask fee on its own profit
//! bookkeeping and pays a raw reward only when a Long is closed.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::engine::{EngineInfo, EngineObservation, EngineStep, TradingEngine};
use super::render::{render_trajectory, CHART_HEIGHT, CHART_WIDTH};
use super::series::PriceSeries;
use crate::error::{QtradeError, Result};
use crate::rl::config::FrameBound;
use crate::rl::core::{Action, Position, SignalFeature, NUM_ACTIONS};

/// Fee model of the engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fee charged when selling (fraction of proceeds)
    pub trade_fee_bid_percent: f64,
    /// Fee charged when buying (fraction of cost)
    pub trade_fee_ask_percent: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            trade_fee_bid_percent: 0.01,
            trade_fee_ask_percent: 0.005,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> std::result::Result<(), Vec<String>> {
        let mut errors = Vec::new();
        if !(0.0..1.0).contains(&self.trade_fee_bid_percent) {
            errors.push("trade_fee_bid_percent must be in [0, 1)".to_string());
        }
        if !(0.0..1.0).contains(&self.trade_fee_ask_percent) {
            errors.push("trade_fee_ask_percent must be in [0, 1)".to_string());
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Single-position stock trading engine
#[derive(Debug, Clone)]
pub struct StocksEngine {
    config: EngineConfig,
    frame_bound: FrameBound,
    window_size: usize,
    /// Close prices of the frame plus `window_size` ticks of history
    prices: Vec<f64>,
    signal_features: Vec<SignalFeature>,
    start_tick: usize,
    end_tick: usize,

    // Episode state
    current_tick: usize,
    last_trade_tick: usize,
    position: Position,
    position_history: Vec<Option<Position>>,
    total_reward: f64,
    total_profit: f64,
    truncated: bool,
}

impl StocksEngine {
    /// Create an engine over `prices[frame.start - window_size .. frame.end]`
    pub fn new(
        series: PriceSeries,
        window_size: usize,
        frame_bound: FrameBound,
        config: EngineConfig,
    ) -> Result<Self> {
        if let Err(errors) = config.validate() {
            return Err(QtradeError::from_violations(errors));
        }
        if window_size == 0 {
            return Err(QtradeError::Validation(
                "window_size must be at least 1".to_string(),
            ));
        }
        if frame_bound.start < window_size {
            return Err(QtradeError::Validation(format!(
                "frame_bound.start ({}) must be at least window_size ({window_size})",
                frame_bound.start
            )));
        }
        if frame_bound.end > series.len() {
            return Err(QtradeError::Validation(format!(
                "frame_bound.end ({}) exceeds the price series length ({})",
                frame_bound.end,
                series.len()
            )));
        }
        if frame_bound.end < frame_bound.start + 2 {
            return Err(QtradeError::Validation(format!(
                "frame ({}, {}) leaves no step to take",
                frame_bound.start, frame_bound.end
            )));
        }

        let prices = series.prices()[frame_bound.start - window_size..frame_bound.end].to_vec();
        let signal_features = signal_features(&prices);
        let start_tick = window_size;
        let end_tick = prices.len() - 1;

        let mut engine = Self {
            config,
            frame_bound,
            window_size,
            prices,
            signal_features,
            start_tick,
            end_tick,
            current_tick: start_tick,
            last_trade_tick: start_tick - 1,
            position: Position::Short,
            position_history: Vec::new(),
            total_reward: 0.0,
            total_profit: 1.0,
            truncated: false,
        };
        engine.reset_episode();
        Ok(engine)
    }

    fn reset_episode(&mut self) {
        self.truncated = false;
        self.current_tick = self.start_tick;
        self.last_trade_tick = self.current_tick - 1;
        self.position = Position::Short;
        self.position_history = vec![None; self.window_size];
        self.position_history.push(Some(self.position));
        self.total_reward = 0.0;
        self.total_profit = 1.0;
    }

    /// Signal window ending at the current tick
    pub fn window(&self) -> Vec<SignalFeature> {
        self.signal_features[self.current_tick + 1 - self.window_size..=self.current_tick].to_vec()
    }

    fn info(&self) -> EngineInfo {
        EngineInfo {
            total_reward: self.total_reward,
            total_profit: self.total_profit,
            position: self.position,
        }
    }

    fn calculate_reward(&self, action: Action) -> f64 {
        if action.closes(self.position) && self.position == Position::Long {
            self.prices[self.current_tick] - self.prices[self.last_trade_tick]
        } else {
            0.0
        }
    }

    fn update_profit(&mut self, action: Action) {
        if (action.closes(self.position) || self.truncated) && self.position == Position::Long {
            let current_price = self.prices[self.current_tick];
            let last_trade_price = self.prices[self.last_trade_tick];
            let shares =
                self.total_profit * (1.0 - self.config.trade_fee_ask_percent) / last_trade_price;
            self.total_profit = shares * (1.0 - self.config.trade_fee_bid_percent) * current_price;
        }
    }

    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    pub fn signal_features(&self) -> &[SignalFeature] {
        &self.signal_features
    }

    pub fn start_tick(&self) -> usize {
        self.start_tick
    }

    pub fn end_tick(&self) -> usize {
        self.end_tick
    }

    pub fn position_history(&self) -> &[Option<Position>] {
        &self.position_history
    }
}

impl TradingEngine for StocksEngine {
    fn reset(&mut self) -> Result<EngineObservation> {
        self.reset_episode();
        Ok(EngineObservation {
            window: self.window(),
            info: self.info(),
        })
    }

    fn step(&mut self, action: Action) -> Result<EngineStep> {
        if self.current_tick >= self.end_tick {
            return Err(QtradeError::Engine(format!(
                "episode already ended at tick {}; reset required",
                self.current_tick
            )));
        }

        self.truncated = false;
        self.current_tick += 1;
        if self.current_tick == self.end_tick {
            self.truncated = true;
        }

        let raw_reward = self.calculate_reward(action);
        self.total_reward += raw_reward;
        self.update_profit(action);

        if action.closes(self.position) {
            self.position = self.position.opposite();
            self.last_trade_tick = self.current_tick;
        }
        self.position_history.push(Some(self.position));

        debug!(
            tick = self.current_tick,
            action = %action,
            position = %self.position,
            "engine step"
        );

        Ok(EngineStep {
            window: self.window(),
            raw_reward,
            terminated: false,
            truncated: self.truncated,
            info: self.info(),
        })
    }

    fn current_tick(&self) -> usize {
        self.current_tick
    }

    fn last_trade_tick(&self) -> usize {
        self.last_trade_tick
    }

    fn position(&self) -> Position {
        self.position
    }

    fn price(&self, tick: usize) -> Result<f64> {
        self.prices.get(tick).copied().ok_or_else(|| {
            QtradeError::Engine(format!(
                "tick {tick} is outside the frame (0..{})",
                self.prices.len()
            ))
        })
    }

    fn total_profit(&self) -> f64 {
        self.total_profit
    }

    fn set_total_profit(&mut self, profit: f64) {
        self.total_profit = profit;
    }

    fn total_reward(&self) -> f64 {
        self.total_reward
    }

    fn set_total_reward(&mut self, reward: f64) {
        self.total_reward = reward;
    }

    fn action_count(&self) -> usize {
        NUM_ACTIONS
    }

    fn window_size(&self) -> usize {
        self.window_size
    }

    fn frame_bound(&self) -> FrameBound {
        self.frame_bound
    }

    /// Compound every up-run held Long and sit out every down-run, fee-free
    fn max_possible_profit(&self) -> f64 {
        let prices = &self.prices;
        let mut current_tick = self.start_tick;
        let mut last_trade_tick = current_tick - 1;
        let mut profit = 1.0;

        while current_tick <= self.end_tick {
            let position = if prices[current_tick] < prices[current_tick - 1] {
                while current_tick <= self.end_tick
                    && prices[current_tick] < prices[current_tick - 1]
                {
                    current_tick += 1;
                }
                Position::Short
            } else {
                while current_tick <= self.end_tick
                    && prices[current_tick] >= prices[current_tick - 1]
                {
                    current_tick += 1;
                }
                Position::Long
            };

            if position == Position::Long {
                let shares = profit / prices[last_trade_tick];
                profit = shares * prices[current_tick - 1];
            }
            last_trade_tick = current_tick - 1;
        }

        profit
    }

    fn render_all(&self) -> Result<String> {
        Ok(render_trajectory(
            &self.prices,
            &self.position_history,
            self.total_reward,
            self.total_profit,
            CHART_WIDTH,
            CHART_HEIGHT,
        ))
    }
}

/// `(close, close - previous close)` per tick; the first delta is zero
fn signal_features(prices: &[f64]) -> Vec<SignalFeature> {
    prices
        .iter()
        .enumerate()
        .map(|(i, &price)| {
            let diff = if i == 0 { 0.0 } else { price - prices[i - 1] };
            SignalFeature::new(price, diff)
        })
        .collect()
}
