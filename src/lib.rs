pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::config::AppConfig;
use crate::core::{RateQuery, Rates};
use anyhow::Result;
use tracing::{debug, info, warn};

pub enum AppCommand {
    Latest,
    On {
        date: String,
    },
    Rate {
        query: RateQuery,
    },
    Convert {
        amount: f64,
        query: RateQuery,
    },
}

/// Loads the configuration from `config_path`, or the default location.
/// Without a default config file, settings come from the environment.
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    match config_path {
        Some(path) => AppConfig::load_from_path(path),
        None => {
            let default_path = AppConfig::default_config_path()?;
            if default_path.exists() {
                AppConfig::load_from_path(&default_path)
            } else {
                debug!("No config at {}, using environment", default_path.display());
                Ok(AppConfig::from_env())
            }
        }
    }
}

/// Runs `command` against `rates` and returns the rendered output.
pub async fn execute(command: AppCommand, rates: &Rates) -> Result<String> {
    let spinner = cli::ui::new_spinner("Fetching rates...");
    let output = async {
        let output = match command {
            AppCommand::Latest => {
                let response = rates.latest(false).await?;
                cli::rates::display_snapshot("Latest rates", &response)
            }
            AppCommand::On { date } => {
                let response = rates.on(date.as_str()).await?;
                cli::rates::display_snapshot(&format!("Rates on {date}"), &response)
            }
            AppCommand::Rate { query } => cli::rates::display_quote(&rates.quote(&query).await?),
            AppCommand::Convert { amount, query } => {
                cli::rates::display_conversion(&rates.conversion(amount, &query).await?)
            }
        };
        Ok::<_, crate::core::RatesError>(output)
    }
    .await;
    spinner.finish_and_clear();
    Ok(output?)
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("oxrates starting...");

    let config = load_config(config_path)?;
    debug!(
        base_url = %config.base_url,
        cache = %config.cache.kind,
        "Loaded config"
    );

    let cache = store::cache_config(&config)?;
    let rates = Rates::with_cache(None, &config, cache).inspect_err(|e| {
        if e.is_configuration() {
            warn!("Check the configuration file or run `oxrates setup` to create one");
        }
    })?;

    let output = execute(command, &rates).await?;
    println!("{output}");
    Ok(())
}
