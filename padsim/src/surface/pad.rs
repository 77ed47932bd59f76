//! Grid addressing and palette types for the programmer-mode layout.
//!
//! Pads are numbered `RC` in decimal, row first, bottom-left origin:
//!
//! ```text
//!   91 92 93 ... 99      row 9 and column 9 are the function buttons
//!   81 82 83 ... 89      along the top and right edges of the device
//!   ...
//!   11 12 13 ... 19
//! ```
//!
//! Column 0 (10, 20, ...) is not part of the grid.
use std::fmt;

pub const GRID_ROWS: u8 = 9;

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct PadAddress(u8);

impl PadAddress {
    pub fn new(value: u8) -> Result<Self, PadError> {
        let row = value / 10;
        let column = value % 10;
        if !(1..=GRID_ROWS).contains(&row) || column == 0 {
            return Err(PadError::InvalidAddress(value));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn row(self) -> u8 {
        self.0 / 10
    }

    pub fn column(self) -> u8 {
        self.0 % 10
    }

    /// Shift by a raw address delta (±1 is a column, ±10 is a row). Returns
    /// `None` when the result falls off the grid or into column 0.
    pub fn offset(self, delta: i16) -> Option<Self> {
        let shifted = i16::from(self.0) + delta;
        u8::try_from(shifted).ok().and_then(|v| Self::new(v).ok())
    }

    /// Every addressable pad, bottom row first.
    pub fn grid() -> impl Iterator<Item = PadAddress> {
        (11..=99).filter_map(|value| Self::new(value).ok())
    }
}

impl fmt::Display for PadAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Index into the device's 128 color palette. 0 turns a pad off.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct PaletteIndex(u8);

impl PaletteIndex {
    pub const OFF: Self = Self(0);
    pub const WHITE: Self = Self(3);
    pub const RED: Self = Self(5);
    pub const YELLOW: Self = Self(12);
    pub const GREEN: Self = Self(25);
    pub const BLUE: Self = Self(41);
    pub const MAX: u8 = 127;

    /// Values above 127 are clamped; MIDI data bytes are 7 bits wide.
    pub const fn new(value: u8) -> Self {
        if value > Self::MAX {
            Self(Self::MAX)
        } else {
            Self(value)
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_off(self) -> bool {
        self.0 == 0
    }

    /// Step through the palette, wrapping 127 -> 0 and 0 -> 127.
    pub fn drift(self, delta: i16) -> Self {
        let wrapped = (i16::from(self.0) + delta).rem_euclid(128);
        Self(wrapped as u8)
    }
}

impl fmt::Display for PaletteIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct LightState {
    pub address: PadAddress,
    pub color: PaletteIndex,
    pub pulse: bool,
}

impl LightState {
    pub fn new(address: PadAddress, color: PaletteIndex, pulse: bool) -> Self {
        Self {
            address,
            color,
            pulse,
        }
    }

    pub fn off(address: PadAddress) -> Self {
        Self::new(address, PaletteIndex::OFF, false)
    }

    pub fn is_lit(&self) -> bool {
        !self.color.is_off()
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PadError {
    InvalidAddress(u8),
    LayoutOverflow { ordinal: usize, max: usize },
}

impl fmt::Display for PadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidAddress(value) => {
                write!(f, "{} is not an addressable pad", value)
            }
            Self::LayoutOverflow { ordinal, max } => write!(
                f,
                "entity {} does not fit on the grid; at most {} are supported",
                ordinal, max
            ),
        }
    }
}

impl std::error::Error for PadError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_has_81_pads_and_no_column_zero() {
        let pads: Vec<_> = PadAddress::grid().collect();
        assert_eq!(pads.len(), 81);
        assert!(pads.iter().all(|p| p.column() != 0));
        assert_eq!(pads.first().map(|p| p.value()), Some(11));
        assert_eq!(pads.last().map(|p| p.value()), Some(99));
    }

    #[test]
    fn rejects_reserved_and_out_of_range() {
        for value in [0, 5, 10, 20, 50, 90, 100, 255] {
            assert_eq!(
                PadAddress::new(value),
                Err(PadError::InvalidAddress(value))
            );
        }
        let pad = PadAddress::new(34).unwrap();
        assert_eq!((pad.row(), pad.column()), (3, 4));
    }

    #[test]
    fn offset_stays_on_grid() {
        let pad = PadAddress::new(19).unwrap();
        assert_eq!(pad.offset(1), None);
        assert_eq!(pad.offset(-1).map(PadAddress::value), Some(18));
        assert_eq!(pad.offset(10).map(PadAddress::value), Some(29));
        assert_eq!(pad.offset(-10), None);

        let top = PadAddress::new(95).unwrap();
        assert_eq!(top.offset(10), None);
        let left = PadAddress::new(41).unwrap();
        assert_eq!(left.offset(-1), None);
    }

    #[test]
    fn palette_drift_wraps_both_ways() {
        assert_eq!(PaletteIndex::new(127).drift(1), PaletteIndex::OFF);
        assert_eq!(PaletteIndex::OFF.drift(-1), PaletteIndex::new(127));
        assert_eq!(PaletteIndex::new(64).drift(-1).value(), 63);
    }

    #[test]
    fn palette_clamps_to_seven_bits() {
        assert_eq!(PaletteIndex::new(200).value(), 127);
    }
}
