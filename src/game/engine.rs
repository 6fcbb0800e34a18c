use std::collections::BTreeMap;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use super::{
    action::{Action, Direction},
    config::GameConfig,
    map::{Grid, StaticMap},
    state::{CollisionType, Position, Snake, Tile},
};
use crate::protocol::{Handshake, StateMessage};

/// Information about a step
#[derive(Debug, Clone, PartialEq)]
pub struct StepInfo {
    /// Whether the snake ate food this step
    pub ate_food: bool,
    /// Type of collision if one occurred
    pub collision_type: Option<CollisionType>,
}

/// Result of a game step
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// Whether the game has terminated
    pub terminated: bool,
    /// Additional information about the step
    pub info: StepInfo,
}

/// Headless single-snake arena that speaks the server's messages
pub struct Arena {
    config: GameConfig,
    rng: StdRng,
    map: StaticMap,
    snake: Snake,
    food: Vec<Position>,
    score: u32,
    steps: u64,
    is_alive: bool,
}

impl Arena {
    /// Create an arena and lay out stones, snake and food
    pub fn new(config: GameConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let width = config.grid_width;
        let height = config.grid_height;

        let mut arena = Self {
            snake: Snake::new(Position::new(0, 0), Direction::Right, 1),
            map: StaticMap::empty(width, height),
            food: Vec::new(),
            score: 0,
            steps: 0,
            is_alive: true,
            config,
            rng,
        };
        arena.reset();
        arena
    }

    /// Reset the game to initial state with a fresh stone layout
    pub fn reset(&mut self) {
        let center = Position::new(
            (self.config.grid_width / 2) as i32,
            (self.config.grid_height / 2) as i32,
        );
        self.snake = Snake::new(center, Direction::Right, self.config.initial_snake_length);

        // keep the spawn area clear
        let (width, height) = (self.config.grid_width, self.config.grid_height);
        let mut free: Vec<Position> = Grid::filled(width, height, ())
            .positions()
            .filter(|&pos| !self.snake.body.contains(&pos) && pos.manhattan(center) > 2)
            .collect();
        free.shuffle(&mut self.rng);

        let mut tiles = Grid::filled(width, height, Tile::Passage);
        for &stone in free.iter().take(self.config.stone_count) {
            tiles.set(stone, Tile::Stone);
        }
        self.map = StaticMap::new(tiles);

        self.food.clear();
        for _ in 0..self.config.food_count {
            if let Some(pos) = self.spawn_food() {
                self.food.push(pos);
            }
        }

        self.score = 0;
        self.steps = 0;
        self.is_alive = true;
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn map(&self) -> &StaticMap {
        &self.map
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn food(&self) -> &[Position] {
        &self.food
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn is_alive(&self) -> bool {
        self.is_alive
    }

    /// Drop an extra food item, used to stage scenarios
    pub fn place_food(&mut self, pos: Position) {
        if self.map.contains(pos) && !self.food.contains(&pos) {
            self.food.push(pos);
        }
    }

    /// Tile as the server would report it
    fn tile_at(&self, pos: Position) -> Tile {
        if self.snake.body.contains(&pos) {
            Tile::Snake
        } else if self.food.contains(&pos) {
            Tile::Food
        } else if self.map.is_stone(pos) {
            Tile::Stone
        } else {
            Tile::Passage
        }
    }

    pub fn handshake(&self) -> Handshake {
        Handshake::from_map(&self.map)
    }

    /// State message for the current tick with a square sight window
    pub fn observe(&self) -> StateMessage {
        let head = self.snake.head();
        let radius = self.config.sight_radius as i32;
        let mut sight: BTreeMap<String, BTreeMap<String, u8>> = BTreeMap::new();

        for x in head.x - radius..=head.x + radius {
            for y in head.y - radius..=head.y + radius {
                let pos = Position::new(x, y);
                if !self.map.contains(pos) {
                    continue;
                }
                if let Some(code) = self.tile_at(pos).code() {
                    sight
                        .entry(x.to_string())
                        .or_default()
                        .insert(y.to_string(), code);
                }
            }
        }

        StateMessage {
            body: self.snake.body.iter().map(|p| (p.x, p.y)).collect(),
            sight,
            traverse: self.config.traverse,
            step: self.steps,
        }
    }

    /// Execute one step of the game
    pub fn step(&mut self, action: Action) -> StepResult {
        if !self.is_alive {
            return StepResult {
                terminated: true,
                info: StepInfo {
                    ate_food: false,
                    collision_type: None,
                },
            };
        }

        // Update direction based on action (prevent 180° turns)
        if let Action::Move(new_direction) = action {
            if !self.snake.direction.is_opposite(new_direction) {
                self.snake.direction = new_direction;
            }
        }

        let new_head = self.snake.head().moved_in_direction(self.snake.direction);
        self.steps += 1;

        if let Some(collision_type) = self.check_collision(new_head) {
            self.is_alive = false;
            return StepResult {
                terminated: true,
                info: StepInfo {
                    ate_food: false,
                    collision_type: Some(collision_type),
                },
            };
        }

        let ate_food = match self.food.iter().position(|&f| f == new_head) {
            Some(idx) => {
                self.food.swap_remove(idx);
                true
            }
            None => false,
        };

        self.snake.move_snake(ate_food);

        if ate_food {
            self.score += 1;
            if let Some(pos) = self.spawn_food() {
                self.food.push(pos);
            }
        }

        StepResult {
            terminated: false,
            info: StepInfo {
                ate_food,
                collision_type: None,
            },
        }
    }

    fn check_collision(&self, pos: Position) -> Option<CollisionType> {
        if !self.map.contains(pos) {
            return Some(CollisionType::Wall);
        }

        if self.snake.collides_with_body(pos) {
            return Some(CollisionType::SelfCollision);
        }

        if self.map.is_stone(pos) && !self.config.traverse {
            return Some(CollisionType::Stone);
        }

        None
    }

    /// Random empty cell, or None when the board is full
    fn spawn_food(&mut self) -> Option<Position> {
        let (width, height) = self.map.size();
        let free: Vec<Position> = Grid::filled(width, height, ())
            .positions()
            .filter(|&pos| self.tile_at(pos) == Tile::Passage)
            .collect();
        free.choose(&mut self.rng).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arena() -> Arena {
        Arena::new(GameConfig::small().with_seed(11))
    }

    #[test]
    fn test_reset() {
        let arena = arena();

        assert!(arena.is_alive());
        assert_eq!(arena.score(), 0);
        assert_eq!(arena.steps(), 0);
        assert_eq!(arena.snake().len(), 3);
        assert_eq!(arena.food().len(), 1);
    }

    #[test]
    fn test_stones_avoid_spawn() {
        let config = GameConfig {
            stone_count: 30,
            ..GameConfig::small().with_seed(3)
        };
        let arena = Arena::new(config);
        let head = arena.snake().head();

        assert_eq!(arena.map().stones().len(), 30);
        for &stone in arena.map().stones() {
            assert!(stone.manhattan(head) > 2);
        }
        for &food in arena.food() {
            assert!(!arena.map().is_stone(food));
        }
    }

    #[test]
    fn test_basic_movement() {
        let mut arena = arena();
        let initial_head = arena.snake().head();

        let result = arena.step(Action::Continue);

        assert!(!result.terminated);
        assert_eq!(arena.steps(), 1);
        assert_eq!(arena.snake().head(), initial_head.moved_by(1, 0));
    }

    #[test]
    fn test_food_consumption() {
        let mut arena = arena();
        let target = arena.snake().head().moved_by(1, 0);
        arena.food.clear();
        arena.place_food(target);
        let initial_length = arena.snake().len();

        let result = arena.step(Action::Continue);

        assert!(result.info.ate_food);
        assert_eq!(arena.score(), 1);
        assert_eq!(arena.snake().len(), initial_length + 1);
        assert_eq!(arena.food().len(), 1);
    }

    #[test]
    fn test_wall_collision() {
        let mut arena = arena();
        arena.snake = Snake::new(Position::new(0, 5), Direction::Left, 1);

        let result = arena.step(Action::Continue);

        assert!(result.terminated);
        assert!(!arena.is_alive());
        assert_eq!(result.info.collision_type, Some(CollisionType::Wall));
    }

    #[test]
    fn test_stone_collision_depends_on_traverse() {
        let mut tiles = Grid::filled(11, 11, Tile::Passage);
        tiles.set(Position::new(6, 5), Tile::Stone);

        let mut arena = arena();
        arena.map = StaticMap::new(tiles.clone());
        let result = arena.step(Action::Continue);
        assert_eq!(result.info.collision_type, Some(CollisionType::Stone));

        let mut arena = Arena::new(GameConfig {
            traverse: true,
            ..GameConfig::small().with_seed(11)
        });
        arena.map = StaticMap::new(tiles);
        let result = arena.step(Action::Continue);
        assert!(!result.terminated);
        assert_eq!(arena.snake().head(), Position::new(6, 5));
    }

    #[test]
    fn test_prevent_180_degree_turn() {
        let mut arena = arena();
        arena.step(Action::Move(Direction::Left));
        assert_eq!(arena.snake().direction, Direction::Right);
    }

    #[test]
    fn test_terminated_game_no_update() {
        let mut arena = arena();
        arena.is_alive = false;
        let steps_before = arena.steps();

        let result = arena.step(Action::Continue);

        assert!(result.terminated);
        assert_eq!(arena.steps(), steps_before);
    }

    #[test]
    fn test_observe_window() {
        let arena = arena();
        let message = arena.observe();
        let snapshot = message.into_snapshot(11, 11).unwrap();
        let head = arena.snake().head();

        assert_eq!(snapshot.head(), Some(head));
        assert_eq!(snapshot.sight.tile(head), Tile::Snake);
        for (pos, _) in snapshot.sight.visible() {
            assert!(pos.x.abs_diff(head.x) <= 3 && pos.y.abs_diff(head.y) <= 3);
        }
        assert_eq!(snapshot.sight.visible().count(), 49);
        assert_eq!(snapshot.sight.tile(Position::new(0, 0)), Tile::Unknown);
    }

    #[test]
    fn test_handshake_matches_map() {
        let arena = Arena::new(GameConfig {
            stone_count: 12,
            ..GameConfig::small().with_seed(5)
        });
        let map = arena.handshake().into_map().unwrap();
        assert_eq!(map.stones(), arena.map().stones());
    }
}
