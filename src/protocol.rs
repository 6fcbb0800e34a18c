//! JSON messages exchanged with the game server
//!
//! Inbound, once: the handshake carrying the static map (indexed `[x][y]`)
//! and its size. Inbound, per tick: body, sparse sight (`x -> y -> tile`),
//! traverse flag and step counter. Outbound: a join command, then one key
//! command per tick.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::game::{Action, Grid, Position, Sight, Snapshot, StaticMap, Tile};

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed message: {0}")]
    Json(#[from] serde_json::Error),
    #[error("map has {actual} columns, expected {expected}")]
    ColumnCount { expected: usize, actual: usize },
    #[error("map column {x} has {actual} rows, expected {expected}")]
    RowCount {
        x: usize,
        expected: usize,
        actual: usize,
    },
    #[error("unknown tile code {code} at ({x}, {y})")]
    UnknownTile { code: u8, x: i64, y: i64 },
    #[error("sight key {0:?} is not a coordinate")]
    BadCoordinate(String),
}

/// Outbound command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "lowercase")]
pub enum Command {
    Join { name: String },
    Key { key: String },
}

impl Command {
    pub fn join(name: impl Into<String>) -> Self {
        Command::Join { name: name.into() }
    }

    pub fn key(action: Action) -> Self {
        Command::Key {
            key: action.key().to_string(),
        }
    }

    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// First inbound message: the static layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Handshake {
    /// Tile codes indexed `[x][y]`
    pub map: Vec<Vec<u8>>,
    /// `[width, height]`
    pub size: (usize, usize),
}

impl Handshake {
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(line)?)
    }

    pub fn from_map(map: &StaticMap) -> Self {
        let (width, height) = map.size();
        let columns = (0..width as i32)
            .map(|x| {
                (0..height as i32)
                    .map(|y| {
                        if map.is_stone(Position::new(x, y)) {
                            1
                        } else {
                            0
                        }
                    })
                    .collect()
            })
            .collect();

        Self {
            map: columns,
            size: (width, height),
        }
    }

    pub fn into_map(self) -> Result<StaticMap, ProtocolError> {
        let (width, height) = self.size;
        if self.map.len() != width {
            return Err(ProtocolError::ColumnCount {
                expected: width,
                actual: self.map.len(),
            });
        }

        let mut tiles = Grid::filled(width, height, Tile::Passage);
        for (x, column) in self.map.iter().enumerate() {
            if column.len() != height {
                return Err(ProtocolError::RowCount {
                    x,
                    expected: height,
                    actual: column.len(),
                });
            }
            for (y, &code) in column.iter().enumerate() {
                let tile = Tile::from_code(code).ok_or(ProtocolError::UnknownTile {
                    code,
                    x: x as i64,
                    y: y as i64,
                })?;
                tiles.set(Position::new(x as i32, y as i32), tile);
            }
        }

        Ok(StaticMap::new(tiles))
    }
}

/// Per-tick inbound message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateMessage {
    /// `[x, y]` pairs, head first
    pub body: Vec<(i32, i32)>,
    /// `x -> y -> tile code`, only cells in sight
    pub sight: BTreeMap<String, BTreeMap<String, u8>>,
    pub traverse: bool,
    pub step: u64,
}

fn coordinate(key: &str) -> Result<i32, ProtocolError> {
    key.trim()
        .parse()
        .map_err(|_| ProtocolError::BadCoordinate(key.to_string()))
}

impl StateMessage {
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(line)?)
    }

    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let mut sight: BTreeMap<String, BTreeMap<String, u8>> = BTreeMap::new();
        for (pos, tile) in snapshot.sight.visible() {
            if let Some(code) = tile.code() {
                sight
                    .entry(pos.x.to_string())
                    .or_default()
                    .insert(pos.y.to_string(), code);
            }
        }

        Self {
            body: snapshot.body.iter().map(|p| (p.x, p.y)).collect(),
            sight,
            traverse: snapshot.traverse,
            step: snapshot.step,
        }
    }

    /// Dense snapshot for a `width × height` map
    ///
    /// Sight entries outside the map are dropped with a warning.
    pub fn into_snapshot(self, width: usize, height: usize) -> Result<Snapshot, ProtocolError> {
        let mut visible = Vec::new();
        for (x_key, column) in &self.sight {
            let x = coordinate(x_key)?;
            for (y_key, &code) in column {
                let y = coordinate(y_key)?;
                let tile = Tile::from_code(code).ok_or(ProtocolError::UnknownTile {
                    code,
                    x: x as i64,
                    y: y as i64,
                })?;
                visible.push((Position::new(x, y), tile));
            }
        }

        let (sight, rejected) = Sight::from_visible(width, height, visible);
        if !rejected.is_empty() {
            warn!(count = rejected.len(), step = self.step, "sight cells outside the map ignored");
        }

        let body = self.body.into_iter().map(Position::from).collect();
        Ok(Snapshot::new(body, sight, self.traverse, self.step))
    }
}
