//! Long-horizon exploration: quadrant partition and target selection
//!
//! The map is cut into a fixed grid of rectangular quadrants. The agent
//! visits them one at a time, travelling to a random reachable cell inside
//! the current one, and forgets all visits once every quadrant has been seen.

use std::collections::BTreeSet;

use rand::Rng;
use tracing::{debug, info, warn};

use crate::agent::search::{SearchSpace, search};
use crate::game::{Position, StaticMap};

/// Axis-aligned rectangle; `max_x` and `max_y` are exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
}

impl Bounds {
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= self.min_x && pos.x < self.max_x && pos.y >= self.min_y && pos.y < self.max_y
    }

    pub fn is_empty(&self) -> bool {
        self.min_x >= self.max_x || self.min_y >= self.max_y
    }

    pub fn area(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            ((self.max_x - self.min_x) * (self.max_y - self.min_y)) as usize
        }
    }
}

/// Fixed `cols × rows` partition of a `width × height` map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuadrantGrid {
    cols: usize,
    rows: usize,
    width: usize,
    height: usize,
}

impl QuadrantGrid {
    pub fn new(cols: usize, rows: usize, width: usize, height: usize) -> Self {
        Self {
            cols,
            rows,
            width,
            height,
        }
    }

    pub fn total(&self) -> usize {
        self.cols * self.rows
    }

    /// Rectangle of quadrant `qid`, numbered row by row
    ///
    /// Quadrants are floor-sized; the last column and row stretch to the map
    /// edge so the partition has no gaps.
    pub fn bounds(&self, qid: usize) -> Bounds {
        let quad_w = (self.width / self.cols) as i32;
        let quad_h = (self.height / self.rows) as i32;
        let qx = qid % self.cols;
        let qy = qid / self.cols;

        let min_x = qx as i32 * quad_w;
        let max_x = if qx == self.cols - 1 {
            self.width as i32
        } else {
            min_x + quad_w
        };
        let min_y = qy as i32 * quad_h;
        let max_y = if qy == self.rows - 1 {
            self.height as i32
        } else {
            min_y + quad_h
        };

        Bounds {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }
}

/// Rejection sampler for exploration targets
pub struct TargetSampler<'a, S: SearchSpace> {
    pub map: &'a StaticMap,
    pub body: &'a [Position],
    pub space: &'a S,
    pub min_distance: u32,
    pub max_attempts: usize,
}

impl<S: SearchSpace> TargetSampler<'_, S> {
    /// Random cell in `bounds` that is free, far enough, and reachable
    pub fn pick_target<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        bounds: Bounds,
        head: Position,
    ) -> Option<Position> {
        if bounds.is_empty() {
            return None;
        }

        for _ in 0..self.max_attempts {
            let candidate = Position::new(
                rng.gen_range(bounds.min_x..bounds.max_x),
                rng.gen_range(bounds.min_y..bounds.max_y),
            );

            if self.body.contains(&candidate) || self.map.is_stone(candidate) {
                continue;
            }
            if head.manhattan(candidate) < self.min_distance {
                continue;
            }
            if !search(self.space, head, candidate).is_empty() {
                return Some(candidate);
            }
        }

        None
    }
}

/// Exploration progress carried across ticks
#[derive(Debug, Clone)]
pub struct ExplorationState {
    grid: QuadrantGrid,
    current_quadrant: Option<usize>,
    target: Option<Position>,
    visited: BTreeSet<usize>,
}

impl ExplorationState {
    pub fn new(grid: QuadrantGrid) -> Self {
        Self {
            grid,
            current_quadrant: None,
            target: None,
            visited: BTreeSet::new(),
        }
    }

    pub fn grid(&self) -> &QuadrantGrid {
        &self.grid
    }

    pub fn target(&self) -> Option<Position> {
        self.target
    }

    pub fn current_quadrant(&self) -> Option<usize> {
        self.current_quadrant
    }

    pub fn visited(&self) -> &BTreeSet<usize> {
        &self.visited
    }

    pub fn needs_target(&self, head: Position) -> bool {
        self.target.map_or(true, |target| target == head)
    }

    /// Never lets the visited set reach the full quadrant set
    fn mark_visited(&mut self, qid: usize) {
        self.visited.insert(qid);
        if self.visited.len() >= self.grid.total() {
            debug!("all quadrants visited, starting a new sweep");
            self.visited.clear();
        }
    }

    fn choose_quadrant<R: Rng + ?Sized>(&mut self, rng: &mut R) -> usize {
        let mut candidates: Vec<usize> = (0..self.grid.total())
            .filter(|qid| !self.visited.contains(qid))
            .collect();
        if candidates.is_empty() {
            self.visited.clear();
            candidates = (0..self.grid.total()).collect();
        }
        candidates[rng.gen_range(0..candidates.len())]
    }

    /// Rotate to a new quadrant and target when the current one is reached
    ///
    /// Returns the new target when a rotation happened.
    pub fn refresh<R, S>(
        &mut self,
        head: Position,
        sampler: &TargetSampler<'_, S>,
        rng: &mut R,
    ) -> Option<Position>
    where
        R: Rng + ?Sized,
        S: SearchSpace,
    {
        if !self.needs_target(head) {
            return None;
        }

        if let Some(previous) = self.current_quadrant {
            self.mark_visited(previous);
        }

        let mut qid = self.choose_quadrant(rng);
        let mut candidate = sampler.pick_target(rng, self.grid.bounds(qid), head);

        if candidate.is_none() {
            debug!(quadrant = qid, "no reachable target, trying another quadrant");
            self.mark_visited(qid);
            qid = self.choose_quadrant(rng);
            candidate = sampler.pick_target(rng, self.grid.bounds(qid), head);
        }

        self.current_quadrant = Some(qid);
        let target = match candidate {
            Some(target) => {
                info!(quadrant = qid, x = target.x, y = target.y, "new exploration target");
                target
            }
            None => {
                warn!(quadrant = qid, "no exploration target found, holding position");
                head
            }
        };
        self.target = Some(target);
        Some(target)
    }
}
