//! Trading Environment Adapter
//!
//! Wraps a [`TradingEngine`] so that every step reports a discrete indicator
//! state, a shaped reward and a fee-free profit in place of the engine's own.

use tracing::trace;

use super::engine::{EngineInfo, TradingEngine};
use crate::error::Result;
use crate::rl::core::{
    reconcile_profit, Action, DiscreteState, IndicatorExtractor, IndicatorReward,
    ProfitTransition, RewardFunction, RewardSignal, RewardTransition, StateExtractor,
};

/// Outcome of one adapted step
#[derive(Debug, Clone, PartialEq)]
pub struct AdapterStep {
    pub state: DiscreteState,
    pub reward: RewardSignal,
    pub terminated: bool,
    pub truncated: bool,
    pub info: EngineInfo,
}

impl AdapterStep {
    pub fn is_done(&self) -> bool {
        self.terminated || self.truncated
    }
}

/// Engine wrapper with pluggable state extraction and reward shaping
pub struct TradingEnvAdapter<E: TradingEngine> {
    engine: E,
    extractor: Box<dyn StateExtractor>,
    reward_fn: Box<dyn RewardFunction>,
    /// Shaped reward accumulated over the current episode
    total_reward: f64,
}

impl<E: TradingEngine> TradingEnvAdapter<E> {
    /// Adapter with the indicator extractor and default reward constants
    pub fn new(engine: E) -> Self {
        Self::with_components(
            engine,
            Box::new(IndicatorExtractor::new()),
            Box::new(IndicatorReward::new()),
        )
    }

    pub fn with_components(
        engine: E,
        extractor: Box<dyn StateExtractor>,
        reward_fn: Box<dyn RewardFunction>,
    ) -> Self {
        Self {
            engine,
            extractor,
            reward_fn,
            total_reward: 0.0,
        }
    }

    /// Start a new episode and return its initial state
    pub fn reset(&mut self) -> Result<(DiscreteState, EngineInfo)> {
        let obs = self.engine.reset()?;
        self.total_reward = 0.0;
        self.engine.set_total_reward(0.0);

        let state = self.extractor.extract(&obs.window)?;
        let info = EngineInfo {
            total_reward: 0.0,
            ..obs.info
        };
        Ok((state, info))
    }

    /// Apply `action`, then replace the engine's reward and profit
    pub fn step(&mut self, action: Action) -> Result<AdapterStep> {
        let position = self.engine.position();
        let last_trade_tick = self.engine.last_trade_tick();
        let prev_profit = self.engine.total_profit();

        let step = self.engine.step(action)?;

        let current_price = self.engine.price(self.engine.current_tick())?;
        let last_trade_price = self.engine.price(last_trade_tick)?;
        let state = self.extractor.extract(&step.window)?;

        let reward = self.reward_fn.compute(&RewardTransition {
            action,
            position,
            current_price,
            last_trade_price,
            state,
        });
        self.total_reward += reward.total;
        self.engine.set_total_reward(self.total_reward);

        let total_profit = reconcile_profit(&ProfitTransition {
            action,
            position,
            current_price,
            last_trade_price,
            truncated: step.truncated,
            total_profit: prev_profit,
        });
        self.engine.set_total_profit(total_profit);

        trace!(
            action = %action,
            state = %state,
            reward = reward.total,
            total_profit,
            "adapter step"
        );

        Ok(AdapterStep {
            state,
            reward,
            terminated: step.terminated,
            truncated: step.truncated,
            info: EngineInfo {
                total_reward: self.total_reward,
                total_profit,
                position: self.engine.position(),
            },
        })
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn into_engine(self) -> E {
        self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QtradeError;
    use crate::rl::config::FrameBound;
    use crate::rl::core::{Position, SignalFeature};
    use crate::rl::environment::engine::{EngineObservation, EngineStep, MockTradingEngine};
    use crate::rl::environment::series::PriceSeries;
    use crate::rl::environment::stocks::{EngineConfig, StocksEngine};

    fn adapter() -> TradingEnvAdapter<StocksEngine> {
        let series = PriceSeries::new(vec![10.0, 11.0, 12.0, 11.0, 13.0]).unwrap();
        let engine =
            StocksEngine::new(series, 2, FrameBound::new(2, 5), EngineConfig::default()).unwrap();
        TradingEnvAdapter::new(engine)
    }

    #[test]
    fn test_reset_state() {
        let mut env = adapter();
        let (state, info) = env.reset().unwrap();

        assert_eq!(state, DiscreteState::new(1, -1, 1, 0.5, 0));
        assert_eq!(info.total_reward, 0.0);
        assert_eq!(info.total_profit, 1.0);
        assert_eq!(info.position, Position::Short);
    }

    #[test]
    fn test_step_replaces_reward_and_profit() {
        let mut env = adapter();
        env.reset().unwrap();

        // Buy while Short: no momentum at tick 3 and a flat move since tick 1
        let step = env.step(Action::Buy).unwrap();
        assert_eq!(step.state, DiscreteState::new(0, 0, 0, 0.5, 0));
        assert_eq!(step.reward.total, -1.5);
        assert_eq!(step.info.position, Position::Long);
        assert_eq!(env.engine().total_reward(), -1.5);

        // Sell while Long closes 11 -> 13 with no fees applied
        let step = env.step(Action::Sell).unwrap();
        assert!(step.truncated);
        assert!(step.is_done());
        assert!((step.info.total_profit - 13.0 / 11.0).abs() < 1e-12);
        assert!((env.engine().total_profit() - 13.0 / 11.0).abs() < 1e-12);
        assert_eq!(env.engine().total_reward(), step.info.total_reward);
    }

    #[test]
    fn test_reset_clears_accumulated_reward() {
        let mut env = adapter();
        env.reset().unwrap();
        env.step(Action::Sell).unwrap();
        assert!(env.engine().total_reward() != 0.0);

        let (_, info) = env.reset().unwrap();
        assert_eq!(info.total_reward, 0.0);
        assert_eq!(env.engine().total_reward(), 0.0);
    }

    #[test]
    fn test_engine_failure_propagates() {
        let mut engine = MockTradingEngine::new();
        engine.expect_position().return_const(Position::Short);
        engine.expect_last_trade_tick().return_const(1usize);
        engine.expect_total_profit().return_const(1.0);
        engine
            .expect_step()
            .returning(|_| Err(QtradeError::Engine("feed dropped".to_string())));
        engine.expect_set_total_profit().never();
        engine.expect_set_total_reward().never();

        let mut env = TradingEnvAdapter::new(engine);
        let err = env.step(Action::Buy).unwrap_err();
        assert!(matches!(err, QtradeError::Engine(msg) if msg == "feed dropped"));
    }

    #[test]
    fn test_engine_fee_profit_is_overwritten() {
        let window = vec![
            SignalFeature::new(10.0, 0.0),
            SignalFeature::new(12.0, 2.0),
        ];

        let mut engine = MockTradingEngine::new();
        engine.expect_reset().returning({
            let window = window.clone();
            move || {
                Ok(EngineObservation {
                    window: window.clone(),
                    info: EngineInfo {
                        total_reward: 0.0,
                        total_profit: 1.0,
                        position: Position::Long,
                    },
                })
            }
        });
        engine.expect_position().return_const(Position::Long);
        engine.expect_last_trade_tick().return_const(0usize);
        engine.expect_current_tick().return_const(1usize);
        engine.expect_total_profit().return_const(1.0);
        engine
            .expect_price()
            .returning(|tick| Ok(if tick == 0 { 10.0 } else { 12.0 }));
        engine.expect_step().returning(move |_| {
            Ok(EngineStep {
                window: window.clone(),
                raw_reward: 2.0,
                terminated: false,
                truncated: false,
                // The engine's own fee-adjusted figure
                info: EngineInfo {
                    total_reward: 2.0,
                    total_profit: 1.17,
                    position: Position::Short,
                },
            })
        });
        engine.expect_set_total_reward().return_const(());
        engine
            .expect_set_total_profit()
            .withf(|p| (*p - 1.2).abs() < 1e-12)
            .times(1)
            .return_const(());

        let mut env = TradingEnvAdapter::new(engine);
        env.reset().unwrap();
        let step = env.step(Action::Sell).unwrap();
        assert!((step.info.total_profit - 1.2).abs() < 1e-12);
    }
}
