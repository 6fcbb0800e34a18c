use serde::{Deserialize, Serialize};

/// Configuration for the local arena simulator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Width of the game grid
    pub grid_width: usize,
    /// Height of the game grid
    pub grid_height: usize,
    /// Initial length of the snake
    pub initial_snake_length: usize,
    /// Number of stones scattered at reset
    pub stone_count: usize,
    /// Number of food items kept on the map
    pub food_count: usize,
    /// Half-width of the square window the snake can see around its head
    pub sight_radius: usize,
    /// Stones can be crossed instead of killing the snake
    pub traverse: bool,
    /// Seed for stone and food placement; entropy when unset
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_width: 48,
            grid_height: 24,
            initial_snake_length: 3,
            stone_count: 40,
            food_count: 4,
            sight_radius: 3,
            traverse: false,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with custom grid size
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            grid_width: width,
            grid_height: height,
            ..Default::default()
        }
    }

    /// Create a small, stone-free grid for testing
    pub fn small() -> Self {
        Self {
            stone_count: 0,
            food_count: 1,
            ..Self::new(11, 11)
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check the arena can hold the snake, stones and food
    pub fn validate(&self) -> Result<(), String> {
        if self.grid_width < 3 || self.grid_height < 3 {
            return Err(format!(
                "grid must be at least 3x3, got {}x{}",
                self.grid_width, self.grid_height
            ));
        }

        if self.initial_snake_length == 0 {
            return Err("initial_snake_length must be at least 1".to_string());
        }

        if self.initial_snake_length > self.grid_width / 2 + 1 {
            return Err(format!(
                "initial_snake_length ({}) does not fit a {} wide grid",
                self.initial_snake_length, self.grid_width
            ));
        }

        let cells = self.grid_width * self.grid_height;
        let needed = self.stone_count + self.food_count + self.initial_snake_length;
        if needed >= cells {
            return Err(format!(
                "{} stones, {} food and the snake do not fit in {} cells",
                self.stone_count, self.food_count, cells
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GameConfig::default();
        assert_eq!(config.grid_width, 48);
        assert_eq!(config.grid_height, 24);
        assert_eq!(config.initial_snake_length, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_custom_config() {
        let config = GameConfig::new(15, 15);
        assert_eq!(config.grid_width, 15);
        assert_eq!(config.grid_height, 15);
    }

    #[test]
    fn test_small_config_is_valid() {
        let config = GameConfig::small().with_seed(7);
        assert_eq!(config.seed, Some(7));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overcrowded_config_rejected() {
        let config = GameConfig {
            stone_count: 200,
            ..GameConfig::new(10, 10)
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_tiny_grid_rejected() {
        assert!(GameConfig::new(2, 10).validate().is_err());
    }
}
