//! Agent tuning: cost-model weights and exploration parameters

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::agent::FORBIDDEN_COST;

/// Surcharges applied by the grid cost model
///
/// Every surcharge is additive on top of the base cost of the cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostWeights {
    /// Base cost of an ordinary cell
    ///
    /// Default: 1
    pub step: u32,

    /// Base cost of a food or super food cell
    ///
    /// Default: 0
    pub food: u32,

    /// Base cost of crossing a stone in traverse mode
    ///
    /// Default: 10
    pub stone_traversal: u32,

    /// Cell adjacent to the own body
    ///
    /// Default: 5
    pub body_adjacent: u32,

    /// Cell two steps from the own body
    ///
    /// Default: 2
    pub body_near: u32,

    /// Cell adjacent to a stone
    ///
    /// Default: 2
    pub stone_adjacent: u32,

    /// Cell two steps from a stone
    ///
    /// Default: 1
    pub stone_near: u32,

    /// Cell on the map boundary
    ///
    /// Default: 5
    pub edge: u32,

    /// Cell one step inside the boundary
    ///
    /// Default: 2
    pub edge_inset: u32,

    /// Cell among the recently visited head positions
    ///
    /// Default: 5
    pub recent: u32,

    /// Added to the heuristic when the evaluated cell hugs the boundary
    ///
    /// Default: 5
    pub edge_heuristic_bonus: u32,
}

impl CostWeights {
    fn named(&self) -> [(&'static str, u32); 11] {
        [
            ("step", self.step),
            ("food", self.food),
            ("stone_traversal", self.stone_traversal),
            ("body_adjacent", self.body_adjacent),
            ("body_near", self.body_near),
            ("stone_adjacent", self.stone_adjacent),
            ("stone_near", self.stone_near),
            ("edge", self.edge),
            ("edge_inset", self.edge_inset),
            ("recent", self.recent),
            ("edge_heuristic_bonus", self.edge_heuristic_bonus),
        ]
    }

    /// Every weight must stay below the forbidden-cell cost
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in self.named() {
            if value >= FORBIDDEN_COST {
                return Err(format!("weight {name} ({value}) must be below {FORBIDDEN_COST}"));
            }
        }

        if self.food > self.step {
            return Err(format!(
                "food cost ({}) must not exceed step cost ({})",
                self.food, self.step
            ));
        }

        Ok(())
    }
}

impl Default for CostWeights {
    fn default() -> Self {
        Self {
            step: 1,
            food: 0,
            stone_traversal: 10,
            body_adjacent: 5,
            body_near: 2,
            stone_adjacent: 2,
            stone_near: 1,
            edge: 5,
            edge_inset: 2,
            recent: 5,
            edge_heuristic_bonus: 5,
        }
    }
}

/// Session-wide agent configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Quadrant columns in the exploration partition
    ///
    /// Default: 3
    pub quadrant_cols: usize,

    /// Quadrant rows in the exploration partition
    ///
    /// Default: 3
    pub quadrant_rows: usize,

    /// Minimum Manhattan distance between head and a new exploration target
    ///
    /// Default: 10
    pub min_target_distance: u32,

    /// Samples drawn per quadrant before giving up on it
    ///
    /// Default: 100
    pub max_target_attempts: usize,

    /// Capacity of the recently-visited head window
    ///
    /// Default: 10
    pub recent_window: usize,

    /// RNG seed for exploration sampling; entropy when unset
    pub seed: Option<u64>,

    pub weights: CostWeights,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            quadrant_cols: 3,
            quadrant_rows: 3,
            min_target_distance: 10,
            max_target_attempts: 100,
            recent_window: 10,
            seed: None,
            weights: CostWeights::default(),
        }
    }
}

impl AgentConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a JSON config; missing fields keep their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        config
            .validate()
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        Ok(config)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn total_quadrants(&self) -> usize {
        self.quadrant_cols * self.quadrant_rows
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), String> {
        if self.quadrant_cols == 0 || self.quadrant_rows == 0 {
            return Err(format!(
                "quadrant grid must be at least 1x1, got {}x{}",
                self.quadrant_cols, self.quadrant_rows
            ));
        }

        if self.max_target_attempts == 0 {
            return Err("max_target_attempts must be at least 1".to_string());
        }

        if self.recent_window == 0 {
            return Err("recent_window must be at least 1".to_string());
        }

        self.weights.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = AgentConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.total_quadrants(), 9);
        assert_eq!(config.min_target_distance, 10);
        assert_eq!(config.max_target_attempts, 100);
        assert_eq!(config.recent_window, 10);
    }

    #[test]
    fn test_invalid_quadrant_grid() {
        let config = AgentConfig {
            quadrant_cols: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_food_weight() {
        let mut config = AgentConfig::default();
        config.weights.food = 3;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_weights_must_stay_below_forbidden_cost() {
        let mut config = AgentConfig::default();
        config.weights.edge = u32::MAX;
        let err = config.validate().unwrap_err();
        assert!(err.contains("edge"));

        config.weights.edge = FORBIDDEN_COST - 1;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"min_target_distance": 4, "weights": {{"edge": 9}}}}"#
        )
        .unwrap();

        let config = AgentConfig::load(file.path()).unwrap();
        assert_eq!(config.min_target_distance, 4);
        assert_eq!(config.weights.edge, 9);
        assert_eq!(config.weights.recent, 5);
        assert_eq!(config.quadrant_cols, 3);
    }

    #[test]
    fn test_load_rejects_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"recent_window": 0}}"#).unwrap();
        assert!(AgentConfig::load(file.path()).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(AgentConfig::load(&dir.path().join("missing.json")).is_err());
    }
}
