mod ant;
mod config;
mod food;
mod genetics;
mod hill;
mod world;

pub(crate) use config::{load_config, ColonyConfig, ConfigError};
pub(crate) use world::ColonySimulation;

#[cfg(test)]
mod tests {
    include!("tests.rs");
}
