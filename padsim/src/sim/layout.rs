//! Where each entity lives on the grid.
//!
//! Entity 0 takes the level inputs 11, 21, 31, 41, 51 (bottom to top) and
//! the history row 81..=88 (oldest on the left). Every further entity shifts
//! its inputs one column right and its history one row down, so three
//! entities fill columns 1-3 of rows 1-5 and rows 6-8 of columns 1-8.
use crate::core::prelude::*;
use crate::surface::pad::{PadAddress, PadError};

use super::history::HISTORY_CAPACITY;
use super::level::Level;

pub const MAX_ENTITIES: usize = 3;

const BASE_INPUTS: [u8; Level::COUNT] = [11, 21, 31, 41, 51];
const BASE_HISTORY: [u8; HISTORY_CAPACITY] = [81, 82, 83, 84, 85, 86, 87, 88];

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PadLayout {
    /// One pad per level, indexed by [`Level::index`].
    pub inputs: Vec<PadAddress>,
    /// One pad per history slot, oldest first.
    pub history: Vec<PadAddress>,
}

impl PadLayout {
    pub fn input(&self, level: Level) -> PadAddress {
        self.inputs[level.index()]
    }

    pub fn pads(&self) -> impl Iterator<Item = PadAddress> + '_ {
        self.inputs.iter().chain(self.history.iter()).copied()
    }
}

pub fn base_layout(ordinal: usize) -> Result<PadLayout, PadError> {
    if ordinal >= MAX_ENTITIES {
        return Err(PadError::LayoutOverflow {
            ordinal,
            max: MAX_ENTITIES,
        });
    }

    let shift = ordinal as u8;
    let inputs = BASE_INPUTS
        .iter()
        .map(|pad| PadAddress::new(pad + shift))
        .collect::<Result<Vec<_>, _>>()?;
    let history = BASE_HISTORY
        .iter()
        .map(|pad| PadAddress::new(pad - 10 * shift))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PadLayout { inputs, history })
}

/// Grid pads left over once `entities` layouts are placed, in grid order.
/// These trigger and host the ambient animation.
pub fn reserved_pads(entities: usize) -> Result<Vec<PadAddress>, PadError> {
    let mut used = HashSet::default();
    for ordinal in 0..entities {
        used.extend(base_layout(ordinal)?.pads());
    }
    Ok(PadAddress::grid().filter(|pad| !used.contains(pad)).collect())
}
