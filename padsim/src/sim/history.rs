use std::collections::VecDeque;

use super::level::Level;

pub const HISTORY_CAPACITY: usize = 8;

/// Rolling window of sampled levels, oldest first. Display only.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct History {
    levels: VecDeque<Level>,
}

impl History {
    pub fn new() -> Self {
        Self {
            levels: VecDeque::with_capacity(HISTORY_CAPACITY + 1),
        }
    }

    pub fn push(&mut self, level: Level) {
        self.levels.push_back(level);
        while self.levels.len() > HISTORY_CAPACITY {
            self.levels.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Level> + '_ {
        self.levels.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<Level> {
        self.iter().collect()
    }
}
