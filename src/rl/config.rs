//! RL Configuration
//!
//! Hyperparameters for the Q-learning trainer and the constants of the
//! indicator-based reward.

use serde::{Deserialize, Serialize};

/// Index range of the price series exposed to the agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameBound {
    /// First tick the agent acts on; also the amount of history available
    pub start: usize,
    /// Exclusive upper bound into the price series
    pub end: usize,
}

impl FrameBound {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

impl Default for FrameBound {
    fn default() -> Self {
        Self { start: 5, end: 50 }
    }
}

/// Q-learning hyperparameters, fixed for the whole run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QLearningConfig {
    /// Number of training episodes
    pub episodes: usize,
    /// Frame of the price series used for every episode
    pub frame_bound: FrameBound,
    /// Observation window length (defaults to `frame_bound.start`)
    pub window_size: Option<usize>,
    /// Learning rate (alpha)
    pub learning_rate: f64,
    /// Discount factor (gamma)
    pub discount_factor: f64,
    /// Initial exploration rate
    pub epsilon: f64,
    /// Exploration floor
    pub epsilon_min: f64,
    /// Multiplicative exploration decay applied after each episode
    pub epsilon_decay: f64,
    /// Progress is logged every `log_every` episodes
    pub log_every: usize,
    /// RNG seed for exploration (entropy when absent)
    pub seed: Option<u64>,
    /// Render the final episode's trajectory at the end of the run
    pub render: bool,
}

impl Default for QLearningConfig {
    fn default() -> Self {
        Self {
            episodes: 20_000,
            frame_bound: FrameBound::default(),
            window_size: None,
            learning_rate: 0.7,
            discount_factor: 0.5,
            epsilon: 1.0,
            epsilon_min: 0.01,
            epsilon_decay: 0.9996,
            log_every: 100,
            seed: None,
            render: true,
        }
    }
}

impl QLearningConfig {
    /// Effective observation window length
    pub fn window_size(&self) -> usize {
        self.window_size.unwrap_or(self.frame_bound.start)
    }

    /// Check hyperparameters that do not depend on the price series
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.frame_bound.start < 1 {
            errors.push("frame_bound.start must be at least 1".to_string());
        }

        let window = self.window_size();
        if window < 1 {
            errors.push("window_size must be at least 1".to_string());
        }
        if window > self.frame_bound.start {
            errors.push(format!(
                "window_size ({window}) must not exceed frame_bound.start ({})",
                self.frame_bound.start
            ));
        }

        if self.frame_bound.end < self.frame_bound.start + 2 {
            errors.push(format!(
                "frame_bound.end ({}) must be at least frame_bound.start + 2 ({})",
                self.frame_bound.end,
                self.frame_bound.start + 2
            ));
        }

        if !(0.0..=1.0).contains(&self.learning_rate) {
            errors.push("learning_rate must be between 0 and 1".to_string());
        }

        if !(0.0..=1.0).contains(&self.discount_factor) {
            errors.push("discount_factor must be between 0 and 1".to_string());
        }

        if !(0.0..=1.0).contains(&self.epsilon) {
            errors.push("epsilon must be between 0 and 1".to_string());
        }

        if !(0.0..=1.0).contains(&self.epsilon_min) || self.epsilon_min > self.epsilon {
            errors.push("epsilon_min must be between 0 and epsilon".to_string());
        }

        if !(self.epsilon_decay > 0.0 && self.epsilon_decay <= 1.0) {
            errors.push("epsilon_decay must be in (0, 1]".to_string());
        }

        if self.episodes == 0 {
            errors.push("episodes must be at least 1".to_string());
        }

        if self.log_every == 0 {
            errors.push("log_every must be at least 1".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Check that the frame fits inside a series of `series_len` prices
    pub fn validate_for_series(&self, series_len: usize) -> Result<(), Vec<String>> {
        let mut errors = match self.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => errors,
        };

        if self.frame_bound.end > series_len {
            errors.push(format!(
                "frame_bound.end ({}) exceeds the price series length ({series_len})",
                self.frame_bound.end
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Constants of the indicator-based reward
///
/// Defaults are the tuned values; changing them changes the learned policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// Multiplier on the price move captured by a closing action
    pub profit_multiplier: f64,
    /// Penalty for repeating the direction already held
    pub redundant_penalty: f64,
    /// Bonus for buying oversold / selling overbought
    pub rsi_bonus: f64,
    /// Penalty for buying without momentum
    pub buy_without_momentum_penalty: f64,
    /// Penalty for selling into momentum
    pub sell_with_momentum_penalty: f64,
    /// Loss amplification per unit of relative price move
    pub loss_scale: f64,
    /// Base multiplier applied to gains
    pub gain_floor: f64,
    /// Gain amplification per unit of relative price move
    pub gain_scale: f64,
    /// Relative move below which a step counts as flat
    pub flat_move_threshold: f64,
    /// Penalty applied on flat moves
    pub flat_move_penalty: f64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            profit_multiplier: 3.0,
            redundant_penalty: 0.5,
            rsi_bonus: 1.5,
            buy_without_momentum_penalty: 1.0,
            sell_with_momentum_penalty: 1.5,
            loss_scale: 0.7,
            gain_floor: 1.5,
            gain_scale: 0.3,
            flat_move_threshold: 0.02,
            flat_move_penalty: 0.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = QLearningConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.window_size(), 5);
    }

    #[test]
    fn test_window_larger_than_history_rejected() {
        let config = QLearningConfig {
            window_size: Some(10),
            frame_bound: FrameBound::new(5, 50),
            ..Default::default()
        };
        let errors = config.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.contains("window_size")));
    }

    #[test]
    fn test_zero_lower_bound_rejected() {
        let config = QLearningConfig {
            frame_bound: FrameBound::new(0, 50),
            ..Default::default()
        };
        let errors = config.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.contains("frame_bound.start")));
        assert!(errors.iter().any(|e| e.contains("window_size must be at least 1")));
    }

    #[test]
    fn test_frame_must_allow_a_step() {
        let config = QLearningConfig {
            frame_bound: FrameBound::new(5, 6),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = QLearningConfig {
            frame_bound: FrameBound::new(5, 7),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_frame_beyond_series_rejected() {
        let config = QLearningConfig::default();
        assert!(config.validate_for_series(50).is_ok());
        let errors = config.validate_for_series(49).unwrap_err();
        assert!(errors[0].contains("exceeds the price series length"));
    }

    #[test]
    fn test_epsilon_bounds() {
        let config = QLearningConfig {
            epsilon: 0.1,
            epsilon_min: 0.2,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = QLearningConfig {
            epsilon_decay: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_reward_defaults() {
        let reward = RewardConfig::default();
        assert_eq!(reward.profit_multiplier, 3.0);
        assert_eq!(reward.flat_move_threshold, 0.02);
    }
}
