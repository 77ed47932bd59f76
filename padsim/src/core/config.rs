//! Deserialization types for the optional yaml config file. Every field has
//! a default, so an empty file (or no file) gives the stock simulation.
//!
//! ```yaml
//! entities: 2
//! levels:
//!   - { value: 0.0, color: 41 }
//!   - { value: 0.25, color: 25 }
//!   - { value: 0.5, color: 12 }
//!   - { value: 0.75, color: 5 }
//!   - { value: 1.0, color: 5, pulse: true }
//! animation:
//!   duration_ms: 3000
//!   step_ms: 80
//! ```
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::sim::layout::MAX_ENTITIES;
use crate::sim::level::{Level, LevelSpec, LevelTable};
use crate::surface::codec::DEFAULT_SCROLL_SPEED;
use crate::surface::pad::PaletteIndex;

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct SimConfig {
    pub entities: usize,
    pub levels: Vec<LevelConfig>,
    pub animation: AnimationConfig,
    pub scroll: ScrollConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            entities: MAX_ENTITIES,
            levels: LevelTable::default()
                .specs()
                .iter()
                .map(LevelConfig::from)
                .collect(),
            animation: AnimationConfig::default(),
            scroll: ScrollConfig::default(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct LevelConfig {
    pub value: f64,
    pub color: u8,
    #[serde(default)]
    pub pulse: bool,
}

impl From<&LevelSpec> for LevelConfig {
    fn from(spec: &LevelSpec) -> Self {
        Self {
            value: spec.value,
            color: spec.color.value(),
            pulse: spec.pulse,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub duration_ms: u64,
    pub step_ms: u64,
    /// Candidate moves tried per step before the light holds in place.
    pub max_retries: usize,
    /// Fixed seed for reproducible walks.
    pub seed: Option<u64>,
}

impl AnimationConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    pub fn step(&self) -> Duration {
        Duration::from_millis(self.step_ms)
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            duration_ms: 5_000,
            step_ms: 100,
            max_retries: 64,
            seed: None,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct ScrollConfig {
    pub color: u8,
    pub speed: u8,
    pub seconds: u64,
}

impl ScrollConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.seconds)
    }
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            color: PaletteIndex::WHITE.value(),
            speed: DEFAULT_SCROLL_SPEED,
            seconds: 5,
        }
    }
}

impl SimConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)
            .map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = fs::read_to_string(path).map_err(|e| {
            ConfigError::Io(format!("{}: {}", path.display(), e))
        })?;
        Self::from_yaml(&yaml)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.entities == 0 || self.entities > MAX_ENTITIES {
            return Err(ConfigError::Invalid(format!(
                "entities must be between 1 and {}, got {}",
                MAX_ENTITIES, self.entities
            )));
        }

        if self.levels.len() != Level::COUNT {
            return Err(ConfigError::Invalid(format!(
                "expected {} levels, got {}",
                Level::COUNT,
                self.levels.len()
            )));
        }

        for (i, level) in self.levels.iter().enumerate() {
            if !(0.0..=1.0).contains(&level.value) {
                return Err(ConfigError::Invalid(format!(
                    "level {} value {} is outside [0, 1]",
                    i, level.value
                )));
            }
            if level.color > PaletteIndex::MAX {
                return Err(ConfigError::Invalid(format!(
                    "level {} color {} is outside the palette",
                    i, level.color
                )));
            }
        }

        if self.animation.step_ms == 0 {
            return Err(ConfigError::Invalid(
                "animation.step_ms must be greater than 0".to_string(),
            ));
        }

        if self.scroll.color > PaletteIndex::MAX
            || self.scroll.speed > PaletteIndex::MAX
        {
            return Err(ConfigError::Invalid(
                "scroll color and speed must fit in 7 bits".to_string(),
            ));
        }

        Ok(())
    }

    pub fn level_table(&self) -> Result<LevelTable, ConfigError> {
        self.validate()?;
        let mut specs = *LevelTable::default().specs();
        for (spec, level) in specs.iter_mut().zip(&self.levels) {
            *spec = LevelSpec::new(
                level.value,
                PaletteIndex::new(level.color),
                level.pulse,
            );
        }
        Ok(LevelTable::new(specs))
    }

    pub fn scroll_color(&self) -> PaletteIndex {
        PaletteIndex::new(self.scroll.color)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(String),
    Parse(String),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(reason) => write!(f, "Unable to read config: {}", reason),
            Self::Parse(reason) => {
                write!(f, "Unable to parse config: {}", reason)
            }
            Self::Invalid(reason) => write!(f, "Invalid config: {}", reason),
        }
    }
}

impl Error for ConfigError {}
