use std::fmt;

use crate::surface::pad::{LightState, PadAddress, PaletteIndex};

/// Simulated load level. Ordering matters: selecting a level lights the
/// indicator pads of every level up to and including it.
#[derive(
    Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd,
)]
pub enum Level {
    #[default]
    Idle,
    Low,
    Medium,
    High,
    Critical,
}

impl Level {
    pub const COUNT: usize = 5;
    pub const ALL: [Level; Self::COUNT] = [
        Level::Idle,
        Level::Low,
        Level::Medium,
        Level::High,
        Level::Critical,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// This level and every level below it, lowest first.
    pub fn up_to(self) -> impl Iterator<Item = Level> {
        Self::ALL.into_iter().take(self.index() + 1)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LevelSpec {
    /// Normalized metric value in `[0, 1]`.
    pub value: f64,
    pub color: PaletteIndex,
    pub pulse: bool,
}

impl LevelSpec {
    pub fn new(value: f64, color: PaletteIndex, pulse: bool) -> Self {
        Self {
            value,
            color,
            pulse,
        }
    }
}

/// Value and display style of each level, shared by every entity.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelTable {
    specs: [LevelSpec; Level::COUNT],
}

impl LevelTable {
    pub fn new(specs: [LevelSpec; Level::COUNT]) -> Self {
        Self { specs }
    }

    pub fn spec(&self, level: Level) -> LevelSpec {
        self.specs[level.index()]
    }

    pub fn value(&self, level: Level) -> f64 {
        self.spec(level).value
    }

    pub fn light(&self, level: Level, address: PadAddress) -> LightState {
        let spec = self.spec(level);
        LightState::new(address, spec.color, spec.pulse)
    }

    pub fn specs(&self) -> &[LevelSpec; Level::COUNT] {
        &self.specs
    }
}

impl Default for LevelTable {
    fn default() -> Self {
        Self::new([
            LevelSpec::new(0.01, PaletteIndex::BLUE, false),
            LevelSpec::new(0.25, PaletteIndex::GREEN, false),
            LevelSpec::new(0.50, PaletteIndex::YELLOW, false),
            LevelSpec::new(0.75, PaletteIndex::RED, false),
            LevelSpec::new(0.99, PaletteIndex::RED, true),
        ])
    }
}
