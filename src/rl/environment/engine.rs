//! Trading Engine Contract
//!
//! The gym-like step/reset interface the Q-learning core consumes. The engine
//! owns the price series, tick advancement, the position state machine and
//! its own reward/fee model; the core only reads its fields and overrides the
//! reward and profit it reports.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::rl::config::FrameBound;
use crate::rl::core::{Action, Position, SignalFeature};

/// Running totals reported by the engine after reset/step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineInfo {
    pub total_reward: f64,
    pub total_profit: f64,
    pub position: Position,
}

/// Observation returned by `reset`
#[derive(Debug, Clone, PartialEq)]
pub struct EngineObservation {
    /// Signal window ending at the current tick, oldest first
    pub window: Vec<SignalFeature>,
    pub info: EngineInfo,
}

/// Result of advancing the engine by one tick
#[derive(Debug, Clone, PartialEq)]
pub struct EngineStep {
    /// Signal window ending at the new current tick, oldest first
    pub window: Vec<SignalFeature>,
    /// Reward from the engine's built-in model
    pub raw_reward: f64,
    pub terminated: bool,
    pub truncated: bool,
    pub info: EngineInfo,
}

impl EngineStep {
    pub fn is_done(&self) -> bool {
        self.terminated || self.truncated
    }
}

/// Step/reset engine over a historical price series
///
/// Any `Err` returned here is an engine failure; callers propagate it
/// without retrying.
#[cfg_attr(test, mockall::automock)]
pub trait TradingEngine {
    /// Start a new episode at the lower frame bound
    fn reset(&mut self) -> Result<EngineObservation>;

    /// Apply an action and advance one tick
    fn step(&mut self, action: Action) -> Result<EngineStep>;

    fn current_tick(&self) -> usize;

    fn last_trade_tick(&self) -> usize;

    fn position(&self) -> Position;

    /// Close price at `tick`
    fn price(&self, tick: usize) -> Result<f64>;

    fn total_profit(&self) -> f64;

    fn set_total_profit(&mut self, profit: f64);

    fn total_reward(&self) -> f64;

    fn set_total_reward(&mut self, reward: f64);

    /// Size of the discrete action space
    fn action_count(&self) -> usize;

    /// Signal samples per observation
    fn window_size(&self) -> usize;

    /// Series range the episodes run over
    fn frame_bound(&self) -> FrameBound;

    /// Best profit achievable over the frame
    fn max_possible_profit(&self) -> f64;

    /// Render the current episode's trade trajectory as text
    fn render_all(&self) -> Result<String>;
}
