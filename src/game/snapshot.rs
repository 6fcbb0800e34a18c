use super::map::Sight;
use super::state::Position;

/// Everything the agent learns from one tick's state message
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Own body, head first
    pub body: Vec<Position>,
    pub sight: Sight,
    /// Stones are passable at a penalty when set
    pub traverse: bool,
    pub step: u64,
}

impl Snapshot {
    pub fn new(body: Vec<Position>, sight: Sight, traverse: bool, step: u64) -> Self {
        Self {
            body,
            sight,
            traverse,
            step,
        }
    }

    pub fn head(&self) -> Option<Position> {
        self.body.first().copied()
    }
}
