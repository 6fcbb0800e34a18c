use std::collections::VecDeque;

use crate::game::Position;

/// Bounded window of the agent's last head positions, oldest first
#[derive(Debug, Clone)]
pub struct RecentPositions {
    positions: VecDeque<Position>,
    capacity: usize,
}

impl RecentPositions {
    pub fn new(capacity: usize) -> Self {
        Self {
            positions: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a head position, evicting the oldest entry when full
    pub fn push(&mut self, pos: Position) {
        if self.capacity == 0 {
            return;
        }
        if self.positions.len() == self.capacity {
            self.positions.pop_front();
        }
        self.positions.push_back(pos);
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.positions.contains(&pos)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Position> {
        self.positions.iter()
    }
}
