//! Q-Learning Trainer
//!
//! Runs epsilon-greedy episodes over a [`TradingEnvAdapter`], applies the
//! Bellman update to a lazily populated [`QTable`] and decays exploration once
//! per episode.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::q_table::{QEntry, QTable};
use crate::error::{QtradeError, Result};
use crate::rl::config::QLearningConfig;
use crate::rl::core::{Action, DiscreteState, NUM_ACTIONS};
use crate::rl::environment::{TradingEngine, TradingEnvAdapter};

/// Training statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingStats {
    /// Total episodes completed
    pub episodes: usize,
    /// Total steps taken
    pub steps: usize,
    /// Actions drawn at random
    pub explorations: usize,
    /// Actions taken from the table
    pub exploitations: usize,
    /// Distinct states in the table
    pub states_visited: usize,
}

/// Result from a single episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeResult {
    /// Zero-based episode index
    pub episode: usize,
    /// Sum of shaped rewards
    pub total_reward: f64,
    /// Episode length in steps
    pub steps: usize,
    /// Fee-free profit at episode end
    pub total_profit: f64,
    /// Position-closing actions taken
    pub trades: usize,
    /// Exploration rate after this episode's decay
    pub epsilon: f64,
}

/// Training summary statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub num_episodes: usize,
    pub avg_reward: f64,
    pub best_reward: f64,
    pub avg_profit: f64,
    pub best_profit: f64,
    pub avg_trades: f64,
    pub final_epsilon: f64,
}

/// Everything reported at the end of a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    pub summary: TrainingSummary,
    pub stats: TrainingStats,
    pub final_episode: Option<EpisodeResult>,
    /// Fee-free oracle profit over the frame
    pub max_possible_profit: f64,
    /// Learned table in first-visit order
    pub q_table: Vec<QEntry>,
    /// Trade trajectory of the final episode
    pub rendering: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Tabular Q-learning trainer
pub struct QLearningTrainer<E: TradingEngine> {
    env: TradingEnvAdapter<E>,
    config: QLearningConfig,
    table: QTable,
    epsilon: f64,
    rng: StdRng,
    stats: TrainingStats,
}

impl<E: TradingEngine> QLearningTrainer<E> {
    /// Create a trainer; fails fast on invalid hyperparameters
    pub fn new(env: TradingEnvAdapter<E>, config: QLearningConfig) -> Result<Self> {
        config.validate().map_err(QtradeError::from_violations)?;

        let action_count = env.engine().action_count();
        if action_count != NUM_ACTIONS {
            return Err(QtradeError::Validation(format!(
                "engine exposes {action_count} actions, expected {NUM_ACTIONS}"
            )));
        }

        let (frame, window) = (env.engine().frame_bound(), env.engine().window_size());
        if frame != config.frame_bound || window != config.window_size() {
            return Err(QtradeError::Validation(format!(
                "engine frame ({}, {}) with window {window} does not match configured frame ({}, {}) with window {}",
                frame.start,
                frame.end,
                config.frame_bound.start,
                config.frame_bound.end,
                config.window_size()
            )));
        }

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            env,
            epsilon: config.epsilon,
            config,
            table: QTable::new(),
            rng,
            stats: TrainingStats::default(),
        })
    }

    /// Run every configured episode and collect the run-end report
    pub fn train(&mut self) -> Result<TrainingReport> {
        let started_at = Utc::now();
        info!(
            episodes = self.config.episodes,
            learning_rate = self.config.learning_rate,
            discount_factor = self.config.discount_factor,
            epsilon = self.epsilon,
            seed = ?self.config.seed,
            "starting Q-learning training"
        );

        let mut results = Vec::with_capacity(self.config.episodes);
        for episode in 0..self.config.episodes {
            let result = self.run_episode(episode)?;

            if episode % self.config.log_every == 0 {
                info!(
                    episode,
                    total_reward = result.total_reward,
                    epsilon = self.epsilon,
                    "training progress"
                );
            }
            results.push(result);
        }

        let engine = self.env.engine();
        let max_possible_profit = engine.max_possible_profit();
        let rendering = if self.config.render {
            Some(engine.render_all()?)
        } else {
            None
        };

        let summary = summarize_results(&results);
        info!(
            episodes = summary.num_episodes,
            states = self.table.len(),
            avg_reward = summary.avg_reward,
            final_profit = results.last().map(|r| r.total_profit),
            max_possible_profit,
            "training complete"
        );

        Ok(TrainingReport {
            summary,
            stats: self.stats.clone(),
            final_episode: results.last().cloned(),
            max_possible_profit,
            q_table: self.table.entries().to_vec(),
            rendering,
            started_at,
            finished_at: Utc::now(),
        })
    }

    /// Run one learning episode, then decay epsilon
    pub fn run_episode(&mut self, episode: usize) -> Result<EpisodeResult> {
        let (mut state, _) = self.env.reset()?;
        let mut total_reward = 0.0;
        let mut steps = 0;
        let mut trades = 0;

        let info = loop {
            self.table.ensure(state);
            let action = self.select_action(&state);
            if action.closes(self.env.engine().position()) {
                trades += 1;
            }

            let step = self.env.step(action)?;
            self.table.update(
                state,
                action,
                step.reward.total,
                step.state,
                self.config.learning_rate,
                self.config.discount_factor,
            );

            state = step.state;
            total_reward += step.reward.total;
            steps += 1;

            if step.is_done() {
                break step.info;
            }
        };

        self.decay_epsilon();
        self.stats.episodes += 1;
        self.stats.steps += steps;
        self.stats.states_visited = self.table.len();

        debug!(
            episode,
            total_reward,
            total_profit = info.total_profit,
            steps,
            trades,
            "episode finished"
        );

        Ok(EpisodeResult {
            episode,
            total_reward,
            steps,
            total_profit: info.total_profit,
            trades,
            epsilon: self.epsilon,
        })
    }

    /// Epsilon-greedy choice over the current table
    pub fn select_action(&mut self, state: &DiscreteState) -> Action {
        if self.rng.gen::<f64>() < self.epsilon {
            self.stats.explorations += 1;
            Action::ALL[self.rng.gen_range(0..NUM_ACTIONS)]
        } else {
            self.stats.exploitations += 1;
            self.table.best_action(state)
        }
    }

    /// `epsilon = max(epsilon_min, epsilon * epsilon_decay)`
    pub fn decay_epsilon(&mut self) {
        self.epsilon = (self.epsilon * self.config.epsilon_decay).max(self.config.epsilon_min);
    }

    /// Play one greedy episode without touching the table or epsilon
    pub fn evaluate(&mut self) -> Result<EpisodeResult> {
        let (mut state, _) = self.env.reset()?;
        let mut total_reward = 0.0;
        let mut steps = 0;
        let mut trades = 0;

        let info = loop {
            let action = self.table.best_action(&state);
            if action.closes(self.env.engine().position()) {
                trades += 1;
            }

            let step = self.env.step(action)?;
            state = step.state;
            total_reward += step.reward.total;
            steps += 1;

            if step.is_done() {
                break step.info;
            }
        };

        Ok(EpisodeResult {
            episode: self.stats.episodes,
            total_reward,
            steps,
            total_profit: info.total_profit,
            trades,
            epsilon: 0.0,
        })
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn table(&self) -> &QTable {
        &self.table
    }

    pub fn stats(&self) -> &TrainingStats {
        &self.stats
    }

    pub fn config(&self) -> &QLearningConfig {
        &self.config
    }

    pub fn env(&self) -> &TradingEnvAdapter<E> {
        &self.env
    }
}

/// Summarize training results
pub fn summarize_results(results: &[EpisodeResult]) -> TrainingSummary {
    if results.is_empty() {
        return TrainingSummary::default();
    }

    let n = results.len() as f64;

    let avg_reward = results.iter().map(|r| r.total_reward).sum::<f64>() / n;
    let avg_profit = results.iter().map(|r| r.total_profit).sum::<f64>() / n;
    let avg_trades = results.iter().map(|r| r.trades as f64).sum::<f64>() / n;
    let best_reward = results
        .iter()
        .map(|r| r.total_reward)
        .fold(f64::NEG_INFINITY, f64::max);
    let best_profit = results
        .iter()
        .map(|r| r.total_profit)
        .fold(f64::NEG_INFINITY, f64::max);

    TrainingSummary {
        num_episodes: results.len(),
        avg_reward,
        best_reward,
        avg_profit,
        best_profit,
        avg_trades,
        final_epsilon: results.last().map(|r| r.epsilon).unwrap_or_default(),
    }
}
