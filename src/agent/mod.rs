//! Decision core of the snake agent
//!
//! Provides:
//! - Grid cost model with the hand-tuned risk surcharges
//! - A* path search over 4-connected cells
//! - Direction extraction from a path
//! - Quadrant-based exploration planner
//! - Per-tick controller tying them together

pub mod controller;
pub mod cost;
pub mod direction;
pub mod exploration;
pub mod recent;
pub mod search;

pub use controller::{Agent, Branch, Decision, InvalidConfig, TickError};
pub use cost::{CostModel, FORBIDDEN_COST};
pub use direction::next_direction;
pub use exploration::{Bounds, ExplorationState, QuadrantGrid, TargetSampler};
pub use recent::RecentPositions;
pub use search::{Path, SearchSpace, search};
