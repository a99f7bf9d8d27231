//! Tabular Reinforcement Learning
//!
//! Learns a buy/sell policy over a historical price series.
//!
//! # Components
//!
//! - **State**: a sliding window of prices discretized into indicator flags
//! - **Reward**: hand-tuned shaping over the captured price move and indicators
//! - **Profit**: fee-free reconciliation of realized profit
//! - **Environment**: a step/reset trading engine wrapped by an adapter
//! - **Training**: epsilon-greedy Q-learning over a sparse action-value table
//!
//! # Usage
//!
//! ```no_run
//! use qtrade::rl::config::{FrameBound, QLearningConfig};
//! use qtrade::rl::environment::{
//!     generate_synthetic_prices, EngineConfig, StocksEngine, SyntheticSeriesConfig,
//!     TradingEnvAdapter,
//! };
//! use qtrade::rl::training::QLearningTrainer;
//!
//! # fn main() -> qtrade::Result<()> {
//! let series = generate_synthetic_prices(&SyntheticSeriesConfig::default())?;
//! let config = QLearningConfig::default();
//! let engine = StocksEngine::new(
//!     series,
//!     config.window_size(),
//!     config.frame_bound,
//!     EngineConfig::default(),
//! )?;
//! let mut trainer = QLearningTrainer::new(TradingEnvAdapter::new(engine), config)?;
//! let report = trainer.train()?;
//! println!("max profit: {}", report.max_possible_profit);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod environment;
pub mod training;

pub use config::{FrameBound, QLearningConfig, RewardConfig};
pub use training::{QLearningTrainer, TrainingReport};
