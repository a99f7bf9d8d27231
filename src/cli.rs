use clap::{Parser, Subcommand};

use crate::config::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "qtrade")]
#[command(version)]
#[command(about = "Tabular Q-learning buy/sell agent over a price series", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding default.toml and per-environment overrides
    #[arg(long, global = true, default_value = "config", env = "QTRADE_CONFIG_DIR")]
    pub config_dir: String,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Train a Q-table and print the run report
    Train {
        /// Override the number of training episodes
        #[arg(short, long)]
        episodes: Option<usize>,
        /// Override the exploration RNG seed
        #[arg(short, long)]
        seed: Option<u64>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
        /// Skip the final trajectory chart
        #[arg(long)]
        no_render: bool,
    },
    /// Validate the configuration and print the effective values
    Check,
}

impl Commands {
    /// Apply command-line overrides on top of the loaded configuration
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Commands::Train {
            episodes,
            seed,
            no_render,
            ..
        } = self
        {
            if let Some(episodes) = episodes {
                config.training.episodes = *episodes;
            }
            if let Some(seed) = seed {
                config.training.seed = Some(*seed);
            }
            if *no_render {
                config.training.render = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_train_flags() {
        let cli = Cli::parse_from([
            "qtrade",
            "--config-dir",
            "conf",
            "train",
            "--episodes",
            "50",
            "--seed",
            "9",
            "--json",
            "--no-render",
        ]);
        assert_eq!(cli.config_dir, "conf");
        assert_eq!(
            cli.command,
            Commands::Train {
                episodes: Some(50),
                seed: Some(9),
                json: true,
                no_render: true,
            }
        );
    }

    #[test]
    fn test_overrides_apply_to_training() {
        let cli = Cli::parse_from(["qtrade", "train", "-e", "7", "--no-render"]);
        let mut config = AppConfig::default();
        cli.command.apply_overrides(&mut config);

        assert_eq!(config.training.episodes, 7);
        assert_eq!(config.training.seed, None);
        assert!(!config.training.render);
    }

    #[test]
    fn test_check_leaves_config_alone() {
        let cli = Cli::parse_from(["qtrade", "check"]);
        let mut config = AppConfig::default();
        cli.command.apply_overrides(&mut config);
        assert_eq!(config.training.episodes, 20_000);
    }
}
