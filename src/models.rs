use std::path::Path;

use serde_derive::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("error parsing configuration: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// A desired light configuration anchored at a wall-clock time of day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct TimeStamp {
    #[serde(
        serialize_with = "crate::serde::serialize_time_of_day",
        deserialize_with = "crate::serde::deserialize_time_of_day"
    )]
    pub time: chrono::NaiveTime,
    /// Color temperature in Kelvin
    #[validate(range(min = 1000, max = 40000))]
    pub color: i32,
    /// Brightness in percent
    #[validate(range(min = 0, max = 100))]
    pub brightness: i32,
}

/// A fully resolved light output, ready to hand to a lighting driver
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LightState {
    /// Color temperature in Kelvin
    pub color_temperature: i32,
    /// CIE 1931 xy chromaticity point
    pub xy: [f32; 2],
    /// Brightness in percent
    pub brightness: i32,
}

/// Interpolation endpoints for one managed interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct IntervalConfig {
    #[validate(nested)]
    pub start: TimeStamp,
    #[validate(nested)]
    pub end: TimeStamp,
}

/// Daemon configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Config {
    #[validate(nested)]
    pub interval: IntervalConfig,
}

impl Config {
    pub async fn load_file(path: &Path) -> Result<Self, ConfigError> {
        use tokio::io::AsyncReadExt;

        let mut file = tokio::fs::File::open(path).await?;
        let mut full = String::new();
        file.read_to_string(&mut full).await?;

        let config: Config = toml::from_str(&full)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
