//! Game model shared by the agent and the local simulator
//!
//! This module holds the grid types without any I/O: positions, tiles,
//! actions, the static map, per-tick sight and snapshots, and a headless
//! arena that plays the server's role in simulations and tests.

pub mod action;
pub mod config;
pub mod engine;
pub mod map;
pub mod snapshot;
pub mod state;

// Re-export commonly used types
pub use action::{Action, Direction};
pub use config::GameConfig;
pub use engine::{Arena, StepInfo, StepResult};
pub use map::{Grid, Sight, StaticMap};
pub use snapshot::Snapshot;
pub use state::{CollisionType, Position, Snake, Tile};
