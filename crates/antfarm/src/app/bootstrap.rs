use std::path::PathBuf;
use std::time::Duration;

use engine::LoopConfig;
use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::colony::{load_config, ColonyConfig, ColonySimulation, ConfigError};

const CONFIG_PATH_ENV_VAR: &str = "ANTFARM_CONFIG";
const SEED_ENV_VAR: &str = "ANTFARM_SEED";

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) simulation: ColonySimulation,
    pub(crate) realtime: bool,
}

pub(crate) fn build_app() -> Result<AppWiring, AppError> {
    init_tracing();
    info!("=== Ant Farm Startup ===");

    let mut colony = match config_path_from_env() {
        Some(path) => {
            info!(path = %path.display(), "config_loading");
            load_config(&path)?
        }
        None => ColonyConfig::default(),
    };
    if let Some(seed) = parse_seed_from_env() {
        colony.seed = seed;
    }
    let run_for =
        Duration::try_from_secs_f64(colony.run_seconds).map_err(|err| ConfigError::Invalid {
            path: "run_seconds".to_string(),
            message: err.to_string(),
        })?;
    info!(
        seed = colony.seed,
        ants = colony.ant_count,
        food = colony.food.len(),
        clicks = colony.clicks.len(),
        run_seconds = colony.run_seconds,
        realtime = colony.realtime,
        "colony_config"
    );

    let config = LoopConfig {
        target_tps: colony.target_tps,
        run_for: Some(run_for),
        ..LoopConfig::default()
    };
    let realtime = colony.realtime;

    Ok(AppWiring {
        config,
        simulation: ColonySimulation::new(colony),
        realtime,
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn config_path_from_env() -> Option<PathBuf> {
    std::env::var_os(CONFIG_PATH_ENV_VAR)
        .filter(|raw| !raw.is_empty())
        .map(PathBuf::from)
}

fn parse_seed_from_env() -> Option<u64> {
    let raw = std::env::var(SEED_ENV_VAR).ok()?;
    match parse_seed(&raw) {
        Some(seed) => Some(seed),
        None => {
            warn!(value = %raw, "seed_env_invalid_ignored");
            None
        }
    }
}

fn parse_seed(raw: &str) -> Option<u64> {
    raw.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_parsing_trims_and_rejects_garbage() {
        assert_eq!(parse_seed(" 42 "), Some(42));
        assert_eq!(parse_seed("forty-two"), None);
        assert_eq!(parse_seed("-1"), None);
        assert_eq!(parse_seed(""), None);
    }
}
