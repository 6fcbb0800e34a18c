//! Per-tick decision: chase visible food, otherwise explore

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::{debug, warn};

use crate::agent::cost::CostModel;
use crate::agent::direction::next_direction;
use crate::agent::exploration::{ExplorationState, QuadrantGrid, TargetSampler};
use crate::agent::recent::RecentPositions;
use crate::agent::search::{Path, search};
use crate::config::AgentConfig;
use crate::game::{Action, Position, Snapshot, StaticMap};

/// Reasons a snapshot cannot be acted on
#[derive(Debug, Error, PartialEq)]
pub enum TickError {
    #[error("snapshot has an empty body")]
    EmptyBody,
    #[error("head ({}, {}) lies outside the {width}x{height} map", head.x, head.y)]
    HeadOutOfBounds {
        head: Position,
        width: usize,
        height: usize,
    },
    #[error("sight is {actual_w}x{actual_h} but the map is {width}x{height}")]
    SightMismatch {
        width: usize,
        height: usize,
        actual_w: usize,
        actual_h: usize,
    },
}

/// Agent settings that cannot drive a session
#[derive(Debug, Error, PartialEq)]
#[error("invalid agent configuration: {0}")]
pub struct InvalidConfig(pub String);

/// Which branch produced the tick's action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    /// Heading for visible food at this cell
    Food(Position),
    /// Heading for the exploration target
    Explore(Position),
    /// No usable path this tick
    Idle,
}

/// Outcome of one tick
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub action: Action,
    pub branch: Branch,
    /// Entry-cost sum of the followed path
    pub path_cost: Option<u32>,
    /// Set when the exploration target changed this tick
    pub new_target: Option<Position>,
}

impl Decision {
    fn idle(new_target: Option<Position>) -> Self {
        Self {
            action: Action::Continue,
            branch: Branch::Idle,
            path_cost: None,
            new_target,
        }
    }
}

/// Session-scoped agent: static map, exploration progress and randomness
pub struct Agent<R = StdRng> {
    map: StaticMap,
    config: AgentConfig,
    exploration: ExplorationState,
    recent: RecentPositions,
    rng: R,
}

impl Agent<StdRng> {
    /// Seeded from `config.seed`, or from entropy when unset
    pub fn new(map: StaticMap, config: AgentConfig) -> Result<Self, InvalidConfig> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(map, config, rng)
    }
}

impl<R: Rng> Agent<R> {
    pub fn with_rng(map: StaticMap, config: AgentConfig, rng: R) -> Result<Self, InvalidConfig> {
        config.validate().map_err(InvalidConfig)?;

        let grid = QuadrantGrid::new(
            config.quadrant_cols,
            config.quadrant_rows,
            map.width(),
            map.height(),
        );
        let recent = RecentPositions::new(config.recent_window);

        Ok(Self {
            map,
            config,
            exploration: ExplorationState::new(grid),
            recent,
            rng,
        })
    }

    pub fn map(&self) -> &StaticMap {
        &self.map
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn exploration(&self) -> &ExplorationState {
        &self.exploration
    }

    pub fn recent(&self) -> &RecentPositions {
        &self.recent
    }

    fn check(&self, snapshot: &Snapshot) -> Result<Position, TickError> {
        let head = snapshot.head().ok_or(TickError::EmptyBody)?;
        let (width, height) = self.map.size();

        if !self.map.contains(head) {
            return Err(TickError::HeadOutOfBounds {
                head,
                width,
                height,
            });
        }

        let (actual_w, actual_h) = snapshot.sight.size();
        if (actual_w, actual_h) != (width, height) {
            return Err(TickError::SightMismatch {
                width,
                height,
                actual_w,
                actual_h,
            });
        }

        Ok(head)
    }

    /// Choose this tick's action
    pub fn decide(&mut self, snapshot: &Snapshot) -> Result<Decision, TickError> {
        let head = self.check(snapshot)?;
        self.recent.push(head);

        let model = CostModel::new(&self.map, snapshot, &self.recent, &self.config.weights);
        let sampler = TargetSampler {
            map: &self.map,
            body: &snapshot.body,
            space: &model,
            min_distance: self.config.min_target_distance,
            max_attempts: self.config.max_target_attempts,
        };
        let new_target = self.exploration.refresh(head, &sampler, &mut self.rng);

        if let Some(food) = snapshot.sight.first_food() {
            let path = search(&model, head, food);
            match usable(&model, &path) {
                Some(cost) => {
                    debug!(step = snapshot.step, x = food.x, y = food.y, cost, "chasing food");
                    return Ok(Decision {
                        action: next_direction(&path.cells, head),
                        branch: Branch::Food(food),
                        path_cost: Some(cost),
                        new_target,
                    });
                }
                None if !path.is_empty() => {
                    warn!(
                        step = snapshot.step,
                        "food path starts on a forbidden cell, exploring instead"
                    );
                }
                None => {
                    debug!(step = snapshot.step, x = food.x, y = food.y, "food unreachable");
                }
            }
        }

        let target = self.exploration.target().unwrap_or(head);
        let path = search(&model, head, target);
        match usable(&model, &path) {
            Some(cost) => {
                debug!(step = snapshot.step, x = target.x, y = target.y, cost, "exploring");
                Ok(Decision {
                    action: next_direction(&path.cells, head),
                    branch: Branch::Explore(target),
                    path_cost: Some(cost),
                    new_target,
                })
            }
            None => {
                if !path.is_empty() {
                    warn!(step = snapshot.step, "exploration path starts on a forbidden cell");
                }
                Ok(Decision::idle(new_target))
            }
        }
    }
}

/// Path cost, if the path exists and its first step is safe to take
fn usable(model: &CostModel<'_>, path: &Path) -> Option<u32> {
    let first = path.first()?;
    (!model.is_forbidden(first)).then_some(path.cost)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::cost::FORBIDDEN_COST;
    use crate::game::{Direction, Grid, Sight, Tile};

    fn p(x: i32, y: i32) -> Position {
        Position::new(x, y)
    }

    fn agent(map: StaticMap) -> Agent {
        Agent::new(map, AgentConfig::default().with_seed(5)).unwrap()
    }

    fn snapshot(size: (usize, usize), body: Vec<Position>, traverse: bool) -> Snapshot {
        Snapshot::new(body, Sight::unknown(size.0, size.1), traverse, 1)
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = AgentConfig {
            quadrant_cols: 0,
            ..AgentConfig::default()
        };
        let err = Agent::new(StaticMap::empty(11, 11), config).err().unwrap();
        assert!(err.to_string().contains("quadrant grid"));

        let mut config = AgentConfig::default();
        config.weights.recent = u32::MAX;
        assert!(Agent::new(StaticMap::empty(11, 11), config).is_err());
    }

    #[test]
    fn test_empty_body_is_rejected() {
        let mut agent = agent(StaticMap::empty(11, 11));
        let snap = snapshot((11, 11), vec![], false);
        assert_eq!(agent.decide(&snap), Err(TickError::EmptyBody));
    }

    #[test]
    fn test_head_out_of_bounds_is_rejected() {
        let mut agent = agent(StaticMap::empty(11, 11));
        let snap = snapshot((11, 11), vec![p(11, 0)], false);
        assert!(matches!(
            agent.decide(&snap),
            Err(TickError::HeadOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_sight_size_must_match_map() {
        let mut agent = agent(StaticMap::empty(11, 11));
        let snap = snapshot((10, 11), vec![p(3, 3)], false);
        assert!(matches!(
            agent.decide(&snap),
            Err(TickError::SightMismatch { .. })
        ));
    }

    #[test]
    fn test_moves_up_towards_food() {
        let mut agent = agent(StaticMap::empty(11, 11));
        let mut snap = snapshot((11, 11), vec![p(3, 5)], false);
        snap.sight.set(p(3, 3), Tile::Food);

        let decision = agent.decide(&snap).unwrap();
        assert_eq!(decision.action, Action::Move(Direction::Up));
        assert_eq!(decision.branch, Branch::Food(p(3, 3)));

        // the straight route beats every detour
        let recent = agent.recent().clone();
        let model = CostModel::new(agent.map(), &snap, &recent, &agent.config().weights);
        let direct = search(&model, p(3, 5), p(3, 3));
        assert_eq!(direct.cells, vec![p(3, 4), p(3, 3)]);
        assert_eq!(decision.path_cost, Some(direct.cost));
        let detour: u32 = [p(2, 5), p(2, 4), p(2, 3), p(3, 3)]
            .into_iter()
            .map(|c| model.tile_cost(c))
            .sum();
        assert!(direct.cost < detour);
    }

    #[test]
    fn test_first_food_in_scan_order_wins() {
        let mut agent = agent(StaticMap::empty(11, 11));
        let mut snap = snapshot((11, 11), vec![p(8, 5)], false);
        snap.sight.set(p(2, 5), Tile::Food);
        snap.sight.set(p(8, 3), Tile::Super);

        let decision = agent.decide(&snap).unwrap();
        assert_eq!(decision.branch, Branch::Food(p(2, 5)));
        assert_eq!(decision.action, Action::Move(Direction::Left));
    }

    #[test]
    fn test_unreachable_food_falls_back_to_exploration() {
        let mut agent = agent(StaticMap::empty(11, 11));
        let mut snap = snapshot((11, 11), vec![p(5, 5)], false);
        snap.sight.set(p(0, 0), Tile::Food);
        snap.sight.set(p(1, 0), Tile::Snake);
        snap.sight.set(p(0, 1), Tile::Snake);

        let decision = agent.decide(&snap).unwrap();
        assert!(!matches!(decision.branch, Branch::Food(_)));
        assert!(agent.exploration().target().is_some());
    }

    #[test]
    fn test_explores_without_food() {
        let mut explored = false;
        for seed in 0..16 {
            let config = AgentConfig::default().with_seed(seed);
            let mut agent = Agent::new(StaticMap::empty(11, 11), config).unwrap();
            let snap = snapshot((11, 11), vec![p(5, 5)], false);
            let decision = agent.decide(&snap).unwrap();
            let target = agent.exploration().target().unwrap();
            assert_eq!(decision.new_target, Some(target));

            if target == p(5, 5) {
                assert_eq!(decision.action, Action::Continue);
                assert_eq!(decision.branch, Branch::Idle);
            } else {
                explored = true;
                assert_eq!(decision.branch, Branch::Explore(target));
                assert_ne!(decision.action, Action::Continue);
                assert!(p(5, 5).manhattan(target) >= 10);
            }
        }
        assert!(explored);
    }

    #[test]
    fn test_forbidden_first_step_is_not_taken() {
        // boxed in by stones on every side but one, which is another snake
        let mut tiles = Grid::filled(5, 5, Tile::Passage);
        for pos in [p(2, 1), p(1, 2), p(3, 2)] {
            tiles.set(pos, Tile::Stone);
        }
        let mut agent = agent(StaticMap::new(tiles));
        let mut snap = snapshot((5, 5), vec![p(2, 2)], false);
        for pos in [p(2, 1), p(1, 2), p(3, 2)] {
            snap.sight.set(pos, Tile::Stone);
        }
        snap.sight.set(p(2, 3), Tile::Snake);
        snap.sight.set(p(2, 0), Tile::Food);

        let decision = agent.decide(&snap).unwrap();
        assert_eq!(decision.action, Action::Continue);
        assert_eq!(decision.branch, Branch::Idle);
    }

    #[test]
    fn test_traverse_crosses_single_stone() {
        // one-row corridor with a stone between head and food
        let mut tiles = Grid::filled(7, 1, Tile::Passage);
        tiles.set(p(3, 0), Tile::Stone);
        let map = StaticMap::new(tiles);
        let mut agent = agent(map);
        let mut snap = snapshot((7, 1), vec![p(1, 0)], true);
        snap.sight.set(p(3, 0), Tile::Stone);
        snap.sight.set(p(5, 0), Tile::Food);

        let decision = agent.decide(&snap).unwrap();
        assert_eq!(decision.action, Action::Move(Direction::Right));
        assert_eq!(decision.branch, Branch::Food(p(5, 0)));

        let recent = agent.recent().clone();
        let weights = agent.config().weights.clone();
        let model = CostModel::new(agent.map(), &snap, &recent, &weights);
        let path = search(&model, p(1, 0), p(5, 0));
        assert_eq!(path.cells, vec![p(2, 0), p(3, 0), p(4, 0), p(5, 0)]);
        assert_eq!(decision.path_cost, Some(path.cost));
        let summed: u32 = path.cells.iter().map(|&c| model.tile_cost(c)).sum();
        assert_eq!(path.cost, summed);
        assert!(path.cost < FORBIDDEN_COST);

        // raising the penalty raises the route cost by exactly one crossing
        let mut heavier = weights.clone();
        heavier.stone_traversal += 7;
        let model = CostModel::new(agent.map(), &snap, &recent, &heavier);
        let heavy_path = search(&model, p(1, 0), p(5, 0));
        assert_eq!(heavy_path.cells, path.cells);
        assert_eq!(heavy_path.cost, path.cost + 7);
    }

    #[test]
    fn test_forbidden_cells_are_charged_not_skipped() {
        // without traverse the only route crosses a stone; the first step is
        // still safe, so the agent keeps heading for the food
        let mut tiles = Grid::filled(7, 1, Tile::Passage);
        tiles.set(p(3, 0), Tile::Stone);
        let mut agent = agent(StaticMap::new(tiles));
        let mut snap = snapshot((7, 1), vec![p(1, 0)], false);
        snap.sight.set(p(3, 0), Tile::Stone);
        snap.sight.set(p(5, 0), Tile::Food);

        let decision = agent.decide(&snap).unwrap();
        assert_eq!(decision.branch, Branch::Food(p(5, 0)));
        assert_eq!(decision.action, Action::Move(Direction::Right));
        assert!(decision.path_cost.unwrap() >= FORBIDDEN_COST);
    }

    #[test]
    fn test_fogged_stone_does_not_block_food() {
        // the stone is on the static map but outside sight
        let mut tiles = Grid::filled(7, 1, Tile::Passage);
        tiles.set(p(3, 0), Tile::Stone);
        let mut agent = agent(StaticMap::new(tiles));
        let mut snap = snapshot((7, 1), vec![p(1, 0)], false);
        snap.sight.set(p(5, 0), Tile::Food);

        let decision = agent.decide(&snap).unwrap();
        assert_eq!(decision.branch, Branch::Food(p(5, 0)));
        assert_eq!(decision.action, Action::Move(Direction::Right));
        assert!(decision.path_cost.unwrap() < FORBIDDEN_COST);
    }

    #[test]
    fn test_recent_window_tracks_heads() {
        let mut agent = agent(StaticMap::empty(11, 11));
        for x in 0..12 {
            let snap = snapshot((11, 11), vec![p(x % 11, 5)], false);
            agent.decide(&snap).unwrap();
        }
        assert_eq!(agent.recent().len(), 10);
        assert!(agent.recent().contains(p(0, 5)));
        assert!(!agent.recent().contains(p(1, 5)));
    }
}
