use clap::Parser;
use qtrade::cli::{Cli, Commands};
use qtrade::config::AppConfig;
use qtrade::error::{QtradeError, Result};
use qtrade::logging::{init_logging, init_logging_simple};
use qtrade::rl::core::{IndicatorExtractor, IndicatorReward};
use qtrade::rl::environment::{StocksEngine, TradingEngine, TradingEnvAdapter};
use qtrade::rl::training::{print_report, OutputMode, QLearningTrainer};
use tracing::info;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_from(&cli.config_dir)?;
    cli.command.apply_overrides(&mut config);

    match cli.command {
        Commands::Train { json, .. } => {
            let _guard = init_logging(&config.logging);
            config.validate().map_err(QtradeError::from_violations)?;
            run_training(&config, OutputMode::from_json_flag(json))?;
        }
        Commands::Check => {
            init_logging_simple();
            config.validate().map_err(QtradeError::from_violations)?;
            let engine = build_engine(&config)?;

            println!("{}", config.to_toml()?);
            println!("max_possible_profit = {:.6}", engine.max_possible_profit());
        }
    }

    Ok(())
}

fn build_engine(config: &AppConfig) -> Result<StocksEngine> {
    let series = config.series.resolve()?;
    StocksEngine::new(
        series,
        config.training.window_size(),
        config.training.frame_bound,
        config.engine.clone(),
    )
}

fn run_training(config: &AppConfig, mode: OutputMode) -> Result<()> {
    let engine = build_engine(config)?;
    info!(
        prices = engine.prices().len(),
        window_size = engine.window_size(),
        start_tick = engine.start_tick(),
        end_tick = engine.end_tick(),
        "trading engine ready"
    );

    let env = TradingEnvAdapter::with_components(
        engine,
        Box::new(IndicatorExtractor::new()),
        Box::new(IndicatorReward::with_config(config.reward.clone())),
    );
    let mut trainer = QLearningTrainer::new(env, config.training.clone())?;
    let report = trainer.train()?;

    print_report(&report, mode)
}
