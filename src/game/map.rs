use std::collections::VecDeque;

use super::state::{Position, Tile};

/// Dense width × height grid addressed by `Position`
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    cells: Vec<T>,
}

impl<T: Clone> Grid<T> {
    pub fn filled(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            cells: vec![value; width * height],
        }
    }
}

impl<T> Grid<T> {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Check if a position is within the grid bounds
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.x < self.width as i32 && pos.y >= 0 && pos.y < self.height as i32
    }

    fn index(&self, pos: Position) -> Option<usize> {
        self.contains(pos)
            .then(|| (pos.y as usize) * self.width + (pos.x as usize))
    }

    pub fn get(&self, pos: Position) -> Option<&T> {
        self.index(pos).map(|idx| &self.cells[idx])
    }

    /// Returns false when `pos` is out of bounds
    pub fn set(&mut self, pos: Position, value: T) -> bool {
        match self.index(pos) {
            Some(idx) => {
                self.cells[idx] = value;
                true
            }
            None => false,
        }
    }

    /// All positions, x-major then y ascending
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        let height = self.height as i32;
        (0..self.width as i32).flat_map(move |x| (0..height).map(move |y| Position::new(x, y)))
    }
}

/// Distance from every cell to the nearest source, clamped to `cap`
///
/// Multi-source BFS over the open grid, so distances are Manhattan.
pub fn proximity_field(width: usize, height: usize, sources: &[Position], cap: u8) -> Grid<u8> {
    let mut field = Grid::filled(width, height, cap);
    let mut queue = VecDeque::new();

    for &src in sources {
        if field.set(src, 0) {
            queue.push_back((src, 0u8));
        }
    }

    while let Some((pos, dist)) = queue.pop_front() {
        let next = dist + 1;
        if next >= cap {
            continue;
        }
        for n in pos.adjacent() {
            if matches!(field.get(n), Some(&d) if d > next) {
                field.set(n, next);
                queue.push_back((n, next));
            }
        }
    }

    field
}

/// Cap used for the pre-indexed distance fields; surcharges stop at 2
pub const PROXIMITY_CAP: u8 = 3;

/// The full, fixed stone layout received at session start
#[derive(Debug, Clone)]
pub struct StaticMap {
    tiles: Grid<Tile>,
    stones: Vec<Position>,
    stone_distance: Grid<u8>,
}

impl StaticMap {
    pub fn new(tiles: Grid<Tile>) -> Self {
        let stones: Vec<Position> = tiles
            .positions()
            .filter(|&pos| tiles.get(pos) == Some(&Tile::Stone))
            .collect();
        let stone_distance = proximity_field(tiles.width(), tiles.height(), &stones, PROXIMITY_CAP);

        Self {
            tiles,
            stones,
            stone_distance,
        }
    }

    /// Map without any stones
    pub fn empty(width: usize, height: usize) -> Self {
        Self::new(Grid::filled(width, height, Tile::Passage))
    }

    pub fn width(&self) -> usize {
        self.tiles.width()
    }

    pub fn height(&self) -> usize {
        self.tiles.height()
    }

    pub fn size(&self) -> (usize, usize) {
        (self.width(), self.height())
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.tiles.contains(pos)
    }

    pub fn is_stone(&self, pos: Position) -> bool {
        self.tiles.get(pos) == Some(&Tile::Stone)
    }

    pub fn stones(&self) -> &[Position] {
        &self.stones
    }

    /// Clamped Manhattan distance to the nearest stone
    pub fn stone_distance(&self, pos: Position) -> u8 {
        self.stone_distance.get(pos).copied().unwrap_or(PROXIMITY_CAP)
    }
}

/// What the agent can see this tick; everything else is `Tile::Unknown`
#[derive(Debug, Clone, PartialEq)]
pub struct Sight {
    tiles: Grid<Tile>,
}

impl Sight {
    /// Nothing visible
    pub fn unknown(width: usize, height: usize) -> Self {
        Self {
            tiles: Grid::filled(width, height, Tile::Unknown),
        }
    }

    /// Build from visible cells; out-of-bounds entries are returned back
    pub fn from_visible<I>(width: usize, height: usize, visible: I) -> (Self, Vec<Position>)
    where
        I: IntoIterator<Item = (Position, Tile)>,
    {
        let mut sight = Self::unknown(width, height);
        let mut rejected = Vec::new();
        for (pos, tile) in visible {
            if !sight.tiles.set(pos, tile) {
                rejected.push(pos);
            }
        }
        (sight, rejected)
    }

    pub fn size(&self) -> (usize, usize) {
        (self.tiles.width(), self.tiles.height())
    }

    pub fn tile(&self, pos: Position) -> Tile {
        self.tiles.get(pos).copied().unwrap_or(Tile::Unknown)
    }

    pub fn set(&mut self, pos: Position, tile: Tile) -> bool {
        self.tiles.set(pos, tile)
    }

    /// First food or super food, scanning x-major then y ascending
    pub fn first_food(&self) -> Option<Position> {
        self.tiles.positions().find(|&pos| self.tile(pos).is_food())
    }

    /// Visible (non-unknown) cells in scan order
    pub fn visible(&self) -> impl Iterator<Item = (Position, Tile)> + '_ {
        self.tiles
            .positions()
            .map(|pos| (pos, self.tile(pos)))
            .filter(|(_, tile)| *tile != Tile::Unknown)
    }
}
