//! Grid cost model: entry cost per cell and the search heuristic
//!
//! Costs are charged when a cell is entered. Cells the snake must never
//! enter cost [`FORBIDDEN_COST`], a large finite value, so they lose every
//! comparison against ordinary routes but still take part in arithmetic.

use crate::agent::recent::RecentPositions;
use crate::agent::search::SearchSpace;
use crate::config::CostWeights;
use crate::game::map::{PROXIMITY_CAP, proximity_field};
use crate::game::{Grid, Position, Snapshot, StaticMap, Tile};

/// Entry cost of a cell the snake must not enter
pub const FORBIDDEN_COST: u32 = 10_000;

/// Cost model for one tick
pub struct CostModel<'a> {
    map: &'a StaticMap,
    snapshot: &'a Snapshot,
    recent: &'a RecentPositions,
    weights: &'a CostWeights,
    body_distance: Grid<u8>,
}

impl<'a> CostModel<'a> {
    pub fn new(
        map: &'a StaticMap,
        snapshot: &'a Snapshot,
        recent: &'a RecentPositions,
        weights: &'a CostWeights,
    ) -> Self {
        let body_distance =
            proximity_field(map.width(), map.height(), &snapshot.body, PROXIMITY_CAP);

        Self {
            map,
            snapshot,
            recent,
            weights,
            body_distance,
        }
    }

    /// Steps to the nearest boundary cell
    fn edge_distance(&self, pos: Position) -> i32 {
        let right = self.map.width() as i32 - 1 - pos.x;
        let bottom = self.map.height() as i32 - 1 - pos.y;
        pos.x.min(right).min(pos.y).min(bottom)
    }

    /// Entry cost of `pos`, or [`FORBIDDEN_COST`]
    pub fn tile_cost(&self, pos: Position) -> u32 {
        if !self.map.contains(pos) {
            return FORBIDDEN_COST;
        }

        let body = self.body_distance.get(pos).copied().unwrap_or(PROXIMITY_CAP);
        if body == 0 {
            return FORBIDDEN_COST;
        }

        let tile = self.snapshot.sight.tile(pos);
        if tile == Tile::Snake {
            return FORBIDDEN_COST;
        }

        // only stones in sight block; fogged cells stay passable
        let stone = tile == Tile::Stone;
        if stone && !self.snapshot.traverse {
            return FORBIDDEN_COST;
        }

        let w = self.weights;
        let mut cost = if stone {
            w.stone_traversal
        } else if tile.is_food() {
            w.food
        } else {
            w.step
        };

        cost = cost.saturating_add(match body {
            1 => w.body_adjacent,
            2 => w.body_near,
            _ => 0,
        });

        cost = cost.saturating_add(match self.map.stone_distance(pos) {
            1 => w.stone_adjacent,
            2 => w.stone_near,
            _ => 0,
        });

        cost = cost.saturating_add(match self.edge_distance(pos) {
            0 => w.edge,
            1 => w.edge_inset,
            _ => 0,
        });

        if self.recent.contains(pos) {
            cost = cost.saturating_add(w.recent);
        }

        cost.min(FORBIDDEN_COST)
    }

    pub fn is_forbidden(&self, pos: Position) -> bool {
        self.tile_cost(pos) >= FORBIDDEN_COST
    }

    /// Manhattan distance, plus a bonus when `from` hugs the boundary
    ///
    /// Not admissible: the bonus and the cost surcharges can both exceed the
    /// true remaining cost.
    pub fn heuristic(&self, from: Position, goal: Position) -> u32 {
        let distance = from.manhattan(goal);
        if distance > 0 && self.edge_distance(from) <= 1 {
            distance.saturating_add(self.weights.edge_heuristic_bonus)
        } else {
            distance
        }
    }

    /// In-bounds orthogonal neighbours not showing another snake
    ///
    /// Own body and stones are left to [`CostModel::tile_cost`].
    pub fn neighbors(&self, pos: Position) -> Vec<Position> {
        pos.adjacent()
            .into_iter()
            .filter(|&n| self.map.contains(n) && self.snapshot.sight.tile(n) != Tile::Snake)
            .collect()
    }
}

impl SearchSpace for CostModel<'_> {
    fn neighbors(&self, pos: Position) -> Vec<Position> {
        CostModel::neighbors(self, pos)
    }

    fn cost(&self, pos: Position) -> u32 {
        self.tile_cost(pos)
    }

    fn heuristic(&self, from: Position, goal: Position) -> u32 {
        CostModel::heuristic(self, from, goal)
    }
}
