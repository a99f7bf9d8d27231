//! Trading Environment
//!
//! The step/reset engine contract, a reference stock-trading engine, price
//! series, trajectory rendering and the adapter the Q-learning trainer drives.

pub mod adapter;
pub mod engine;
pub mod render;
pub mod series;
pub mod stocks;

pub use adapter::{AdapterStep, TradingEnvAdapter};
pub use engine::{EngineInfo, EngineObservation, EngineStep, TradingEngine};
pub use render::{render_trajectory, trajectory_title, CHART_HEIGHT, CHART_WIDTH};
pub use series::{generate_synthetic_prices, PriceSeries, SyntheticSeriesConfig};
pub use stocks::{EngineConfig, StocksEngine};
