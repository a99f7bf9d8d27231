//! Core RL abstractions
//!
//! State extraction, actions, reward shaping and profit reconciliation.

pub mod action;
pub mod profit;
pub mod reward;
pub mod state;

pub use action::{Action, Position, NUM_ACTIONS};
pub use profit::{reconcile_profit, ProfitTransition};
pub use reward::{IndicatorReward, RewardFunction, RewardSignal, RewardTransition};
pub use state::{DiscreteState, IndicatorExtractor, SignalFeature, StateExtractor};
