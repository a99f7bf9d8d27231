pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod rl;

pub use config::AppConfig;
pub use error::{QtradeError, Result};
pub use rl::{QLearningConfig, QLearningTrainer, RewardConfig, TrainingReport};
