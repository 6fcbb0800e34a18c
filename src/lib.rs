//! A* Snake - an autonomous agent for a grid snake game
//!
//! This library provides:
//! - Game model and a headless arena (game module)
//! - Cost model, path search and exploration (agent module)
//! - Wire messages of the game server (protocol module)
//! - Session metrics (metrics module)
//! - Execution modes (websocket and pipe sessions, local simulation)

pub mod agent;
pub mod config;
pub mod game;
pub mod metrics;
pub mod modes;
pub mod protocol;
