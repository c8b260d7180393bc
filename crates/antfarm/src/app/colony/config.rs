use std::io;
use std::path::{Path, PathBuf};

use engine::Vec2;
use serde::Deserialize;
use thiserror::Error;

use super::food::{FoodKind, TripPace};
use super::world::MouseButton;

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config json at {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config at {path}: {message}")]
    Invalid { path: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct PointConfig {
    pub(crate) x: f32,
    pub(crate) y: f32,
}

impl PointConfig {
    pub(crate) fn to_vec2(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct HillConfig {
    pub(crate) position: PointConfig,
}

impl Default for HillConfig {
    fn default() -> Self {
        Self {
            position: PointConfig { x: 0.0, y: 0.0 },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct FoodConfig {
    pub(crate) position: PointConfig,
    /// Picked at random when absent.
    #[serde(default)]
    pub(crate) kind: Option<FoodKind>,
}

/// Which ants to select before a scripted click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum GroupSelection {
    /// Ants with nothing queued.
    Available,
    /// Every ant.
    Roaming,
}

/// A scripted click on a food source.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ClickConfig {
    pub(crate) at_seconds: f64,
    /// Index into `food`.
    pub(crate) food: usize,
    #[serde(default)]
    pub(crate) button: MouseButton,
    #[serde(default)]
    pub(crate) select: Option<GroupSelection>,
    /// Halve the current group before clicking. Applied after `select`.
    #[serde(default)]
    pub(crate) split_before: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ColonyConfig {
    pub(crate) seed: u64,
    pub(crate) ant_count: u32,
    pub(crate) hill: HillConfig,
    pub(crate) food: Vec<FoodConfig>,
    pub(crate) ant_speed_seconds_per_unit: f64,
    pub(crate) line_interval_seconds: f64,
    pub(crate) run_seconds: f64,
    pub(crate) target_tps: u32,
    pub(crate) realtime: bool,
    pub(crate) clicks: Vec<ClickConfig>,
}

impl Default for ColonyConfig {
    fn default() -> Self {
        Self {
            seed: 7,
            ant_count: 6,
            hill: HillConfig::default(),
            food: vec![
                FoodConfig {
                    position: PointConfig { x: 6.0, y: 4.0 },
                    kind: Some(FoodKind::Apple),
                },
                FoodConfig {
                    position: PointConfig { x: -5.0, y: 3.0 },
                    kind: Some(FoodKind::Watermelon),
                },
            ],
            ant_speed_seconds_per_unit: 1.0,
            line_interval_seconds: 0.25,
            run_seconds: 60.0,
            target_tps: 60,
            realtime: false,
            clicks: vec![
                ClickConfig {
                    at_seconds: 1.0,
                    food: 0,
                    button: MouseButton::Right,
                    select: None,
                    split_before: false,
                },
                ClickConfig {
                    at_seconds: 30.0,
                    food: 1,
                    button: MouseButton::Right,
                    select: Some(GroupSelection::Roaming),
                    split_before: true,
                },
            ],
        }
    }
}

impl ColonyConfig {
    pub(crate) fn trip_pace(&self) -> TripPace {
        TripPace {
            speed_seconds_per_unit: self.ant_speed_seconds_per_unit,
            line_interval_seconds: self.line_interval_seconds,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.ant_count == 0 {
            return Err(invalid("ant_count", "at least one ant is required"));
        }
        if self.target_tps == 0 {
            return Err(invalid("target_tps", "must be greater than zero"));
        }
        check_non_negative("ant_speed_seconds_per_unit", self.ant_speed_seconds_per_unit)?;
        check_non_negative("line_interval_seconds", self.line_interval_seconds)?;
        check_non_negative("run_seconds", self.run_seconds)?;
        if self.run_seconds == 0.0 {
            return Err(invalid("run_seconds", "must be greater than zero"));
        }
        check_point("hill.position", self.hill.position)?;
        for (index, food) in self.food.iter().enumerate() {
            check_point(&format!("food[{index}].position"), food.position)?;
        }
        for (index, click) in self.clicks.iter().enumerate() {
            check_non_negative(&format!("clicks[{index}].at_seconds"), click.at_seconds)?;
            if click.food >= self.food.len() {
                return Err(invalid(
                    &format!("clicks[{index}].food"),
                    format!(
                        "food index {} out of range for {} food sources",
                        click.food,
                        self.food.len()
                    ),
                ));
            }
        }
        Ok(())
    }
}

pub(crate) fn parse_config_json(raw: &str) -> Result<ColonyConfig, ConfigError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    let config = serde_path_to_error::deserialize::<_, ColonyConfig>(&mut deserializer)
        .map_err(|error| {
            let path = error.path().to_string();
            ConfigError::Parse {
                path,
                source: error.into_inner(),
            }
        })?;
    config.validate()?;
    Ok(config)
}

pub(crate) fn load_config(path: &Path) -> Result<ColonyConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config_json(&raw)
}

fn invalid(path: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        path: path.to_string(),
        message: message.into(),
    }
}

fn check_non_negative(path: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(
            path,
            format!("expected a finite non-negative number, got {value}"),
        ))
    }
}

fn check_point(path: &str, point: PointConfig) -> Result<(), ConfigError> {
    if point.to_vec2().is_finite() {
        Ok(())
    } else {
        Err(invalid(path, "coordinates must be finite"))
    }
}
