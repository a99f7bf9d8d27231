//! Training Infrastructure
//!
//! The action-value table, the Q-learning loop and run-end reporting.

pub mod q_table;
pub mod report;
pub mod trainer;

pub use q_table::{ActionValues, QEntry, QTable};
pub use report::{format_report, print_report, OutputMode};
pub use trainer::{
    summarize_results, EpisodeResult, QLearningTrainer, TrainingReport, TrainingStats,
    TrainingSummary,
};
