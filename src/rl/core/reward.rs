//! Reward Functions
//!
//! Shapes a scalar reward from the chosen action, the held position, the
//! price move since the last trade and the current indicator state.

use serde::{Deserialize, Serialize};

use super::action::{Action, Position};
use super::state::DiscreteState;

// Re-export config
pub use crate::rl::config::RewardConfig;

/// Reward signal components
///
/// `base` is the additive sum of the action rules, `scaled` is `base` after the
/// gain/loss multiplier and `total` additionally carries the flat-move penalty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RewardSignal {
    pub base: f64,
    pub scaled: f64,
    /// Non-positive; zero unless the move since the last trade was flat
    pub flat_move_penalty: f64,
    pub total: f64,
}

/// Information needed to compute a reward
#[derive(Debug, Clone, Copy)]
pub struct RewardTransition {
    /// Action the agent took
    pub action: Action,
    /// Position held before the action was applied
    pub position: Position,
    /// Price at the tick the action lands on
    pub current_price: f64,
    /// Price at the last trade tick
    pub last_trade_price: f64,
    /// Indicators observed at the current tick
    pub state: DiscreteState,
}

impl RewardTransition {
    pub fn price_diff(&self) -> f64 {
        self.current_price - self.last_trade_price
    }
}

/// Trait for computing rewards
pub trait RewardFunction: Send + Sync {
    /// Compute reward from a state transition
    fn compute(&self, transition: &RewardTransition) -> RewardSignal;
}

/// Indicator-based reward
///
/// Rules are summed in order, then the sum is scaled (losses by the size of
/// the move, gains with a higher floor), then the flat-move penalty applies.
#[derive(Debug, Clone, Default)]
pub struct IndicatorReward {
    config: RewardConfig,
}

impl IndicatorReward {
    /// Create with default constants
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom constants
    pub fn with_config(config: RewardConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RewardConfig {
        &self.config
    }

    fn base_reward(&self, t: &RewardTransition) -> f64 {
        let c = &self.config;
        let mut reward = 0.0;

        match t.action {
            Action::Buy => {
                match t.position {
                    Position::Short => {
                        reward += (t.last_trade_price - t.current_price) * c.profit_multiplier
                    }
                    Position::Long => reward -= c.redundant_penalty,
                }
                if t.state.is_oversold() {
                    reward += c.rsi_bonus;
                }
                if !t.state.has_momentum() {
                    reward -= c.buy_without_momentum_penalty;
                }
            }
            Action::Sell => {
                match t.position {
                    Position::Long => {
                        reward += (t.current_price - t.last_trade_price) * c.profit_multiplier
                    }
                    Position::Short => reward -= c.redundant_penalty,
                }
                if t.state.is_overbought() {
                    reward += c.rsi_bonus;
                }
                if t.state.has_momentum() {
                    reward -= c.sell_with_momentum_penalty;
                }
            }
        }

        reward
    }
}

impl RewardFunction for IndicatorReward {
    fn compute(&self, transition: &RewardTransition) -> RewardSignal {
        let c = &self.config;
        let base = self.base_reward(transition);

        let move_size = transition.price_diff().abs();
        let relative_move = move_size / transition.current_price;

        let scaled = if base < 0.0 {
            base * (1.0 + relative_move * c.loss_scale)
        } else if base > 0.0 {
            base * (c.gain_floor + relative_move * c.gain_scale)
        } else {
            base
        };

        let flat_move_penalty = if move_size < c.flat_move_threshold * transition.current_price {
            -c.flat_move_penalty
        } else {
            0.0
        };

        RewardSignal {
            base,
            scaled,
            flat_move_penalty,
            total: scaled + flat_move_penalty,
        }
    }
}
