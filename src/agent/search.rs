//! A* over 4-connected grid cells

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::game::Position;

/// The graph the search runs on
pub trait SearchSpace {
    /// Cells reachable in one step from `pos`
    fn neighbors(&self, pos: Position) -> Vec<Position>;

    /// Cost charged when entering `pos`
    fn cost(&self, pos: Position) -> u32;

    /// Estimated remaining cost from `from` to `goal`
    fn heuristic(&self, from: Position, goal: Position) -> u32;
}

/// Route found by [`search`], excluding the start cell
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Path {
    pub cells: Vec<Position>,
    /// Sum of entry costs along `cells`
    pub cost: u32,
}

impl Path {
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn first(&self) -> Option<Position> {
        self.cells.first().copied()
    }

    pub fn last(&self) -> Option<Position> {
        self.cells.last().copied()
    }
}

#[derive(Clone, Copy, Eq, PartialEq)]
struct FrontierNode {
    priority: u32,
    seq: u64,
    g_cost: u32,
    pos: Position,
}

impl Ord for FrontierNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap behavior, earlier discovery first on ties
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for FrontierNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Cheapest route from `start` to `goal`
///
/// Costs are charged on entry and accumulate with saturation, so forbidden
/// cells make a route unattractive rather than impossible. Returns an empty
/// path when `start == goal` or when the frontier runs dry.
pub fn search<S: SearchSpace + ?Sized>(space: &S, start: Position, goal: Position) -> Path {
    let mut frontier = BinaryHeap::new();
    let mut came_from: HashMap<Position, Position> = HashMap::new();
    let mut cost_so_far: HashMap<Position, u32> = HashMap::new();
    let mut seq = 0u64;

    frontier.push(FrontierNode {
        priority: 0,
        seq,
        g_cost: 0,
        pos: start,
    });
    cost_so_far.insert(start, 0);

    while let Some(current) = frontier.pop() {
        if current.pos == goal {
            return reconstruct_path(&came_from, start, goal, current.g_cost);
        }

        // Skip entries superseded by a cheaper discovery
        if cost_so_far
            .get(&current.pos)
            .is_some_and(|&best| best < current.g_cost)
        {
            continue;
        }

        for next in space.neighbors(current.pos) {
            let new_cost = current.g_cost.saturating_add(space.cost(next));
            let improved = cost_so_far
                .get(&next)
                .map_or(true, |&known| new_cost < known);

            if improved {
                cost_so_far.insert(next, new_cost);
                came_from.insert(next, current.pos);
                seq += 1;
                frontier.push(FrontierNode {
                    priority: new_cost.saturating_add(space.heuristic(next, goal)),
                    seq,
                    g_cost: new_cost,
                    pos: next,
                });
            }
        }
    }

    Path::default()
}

fn reconstruct_path(
    came_from: &HashMap<Position, Position>,
    start: Position,
    goal: Position,
    cost: u32,
) -> Path {
    let mut cells = Vec::new();
    let mut current = goal;
    while current != start {
        cells.push(current);
        match came_from.get(&current) {
            Some(&prev) => current = prev,
            None => return Path::default(),
        }
    }
    cells.reverse();
    Path { cells, cost }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    /// Open rectangle with per-cell costs and walls
    struct TestGrid {
        width: i32,
        height: i32,
        walls: HashSet<Position>,
        costs: HashMap<Position, u32>,
    }

    impl TestGrid {
        fn new(width: i32, height: i32) -> Self {
            Self {
                width,
                height,
                walls: HashSet::new(),
                costs: HashMap::new(),
            }
        }

        fn wall(mut self, x: i32, y: i32) -> Self {
            self.walls.insert(Position::new(x, y));
            self
        }

        fn cost_at(mut self, x: i32, y: i32, cost: u32) -> Self {
            self.costs.insert(Position::new(x, y), cost);
            self
        }
    }

    impl SearchSpace for TestGrid {
        fn neighbors(&self, pos: Position) -> Vec<Position> {
            pos.adjacent()
                .into_iter()
                .filter(|n| n.x >= 0 && n.y >= 0 && n.x < self.width && n.y < self.height)
                .filter(|n| !self.walls.contains(n))
                .collect()
        }

        fn cost(&self, pos: Position) -> u32 {
            self.costs.get(&pos).copied().unwrap_or(1)
        }

        fn heuristic(&self, from: Position, goal: Position) -> u32 {
            from.manhattan(goal)
        }
    }

    fn assert_connected(start: Position, path: &Path) {
        let mut prev = start;
        for &cell in &path.cells {
            assert_eq!(prev.manhattan(cell), 1, "{:?} -> {:?}", prev, cell);
            prev = cell;
        }
    }

    #[test]
    fn test_start_equals_goal() {
        let grid = TestGrid::new(5, 5);
        let path = search(&grid, Position::new(2, 2), Position::new(2, 2));
        assert!(path.is_empty());
        assert_eq!(path.cost, 0);
    }

    #[test]
    fn test_straight_line() {
        let grid = TestGrid::new(5, 5);
        let start = Position::new(0, 2);
        let goal = Position::new(4, 2);
        let path = search(&grid, start, goal);

        assert_eq!(path.len(), 4);
        assert_eq!(path.cost, 4);
        assert_eq!(path.last(), Some(goal));
        assert!(!path.cells.contains(&start));
        assert_connected(start, &path);
    }

    #[test]
    fn test_routes_around_wall() {
        let grid = TestGrid::new(5, 5).wall(2, 1).wall(2, 2).wall(2, 3);
        let start = Position::new(0, 2);
        let goal = Position::new(4, 2);
        let path = search(&grid, start, goal);

        assert_eq!(path.last(), Some(goal));
        assert_connected(start, &path);
        assert!(path.cells.iter().all(|c| c.x != 2 || c.y == 0 || c.y == 4));
        assert_eq!(path.len(), 8);
    }

    #[test]
    fn test_unreachable_goal() {
        let grid = TestGrid::new(5, 5).wall(1, 0).wall(0, 1);
        let path = search(&grid, Position::new(0, 0), Position::new(4, 4));
        assert!(path.is_empty());
    }

    #[test]
    fn test_avoids_expensive_cells() {
        let grid = TestGrid::new(3, 3).cost_at(1, 0, 50);
        let start = Position::new(0, 0);
        let goal = Position::new(2, 0);
        let path = search(&grid, start, goal);

        assert!(!path.cells.contains(&Position::new(1, 0)));
        assert_eq!(path.cost, 4);
        assert_connected(start, &path);
    }

    #[test]
    fn test_crosses_expensive_cell_without_alternative() {
        let grid = TestGrid::new(3, 1).cost_at(1, 0, 10_000);
        let path = search(&grid, Position::new(0, 0), Position::new(2, 0));

        assert_eq!(path.cells, vec![Position::new(1, 0), Position::new(2, 0)]);
        assert_eq!(path.cost, 10_001);
    }

    #[test]
    fn test_cost_saturates() {
        let grid = TestGrid::new(4, 1)
            .cost_at(1, 0, u32::MAX)
            .cost_at(2, 0, u32::MAX);
        let path = search(&grid, Position::new(0, 0), Position::new(3, 0));
        assert_eq!(path.len(), 3);
        assert_eq!(path.cost, u32::MAX);
    }
}
