//! Tile (landblock) records and id encoding.
//!
//! Scale: 1 tile = 192 units square, split into 8x8 cells of 24 units.
//! Terrain words and height indices are stored per vertex (9x9), x-major:
//! the entry for vertex `(x, y)` lives at `x * 9 + y`.

use std::fmt;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{LandscapeError, Result};

/// Cells per tile side.
pub const CELL_DIM: usize = 8;
/// Vertices per tile side (cells + 1).
pub const VERTEX_DIM: usize = CELL_DIM + 1;
/// Side length of a tile in world units.
pub const TILE_SIZE: f32 = 192.0;
/// Side length of a cell in world units.
pub const CELL_SIZE: f32 = TILE_SIZE / CELL_DIM as f32;
/// Largest tile grid coordinate on either axis.
pub const MAX_TILE_COORD: i32 = 255;

/// Packed tile id: `x << 24 | y << 16 | 0xFFFF`, e.g. `0x7D64FFFF`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileId(pub u32);

impl TileId {
    pub const fn from_xy(x: u8, y: u8) -> Self {
        Self((x as u32) << 24 | (y as u32) << 16 | 0xFFFF)
    }

    /// Tile grid x coordinate (high byte).
    pub const fn x(self) -> u32 {
        self.0 >> 24
    }

    /// Tile grid y coordinate (second byte).
    pub const fn y(self) -> u32 {
        self.0 >> 16 & 0xFF
    }

    /// Id of the companion info record (objects and buildings).
    pub const fn info_id(self) -> u32 {
        self.0.wrapping_sub(1)
    }

    /// Tile at a grid offset from this one, or `None` if it falls off the map.
    pub fn offset(self, dx: i32, dy: i32) -> Option<TileId> {
        let x = self.x() as i32 + dx;
        let y = self.y() as i32 + dy;
        if !(0..=MAX_TILE_COORD).contains(&x) || !(0..=MAX_TILE_COORD).contains(&y) {
            return None;
        }
        Some(TileId::from_xy(x as u8, y as u8))
    }

    /// Origin of this tile in global cell coordinates.
    pub const fn cell_origin(self) -> UVec2 {
        UVec2::new(self.x() * CELL_DIM as u32, self.y() * CELL_DIM as u32)
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08X}", self.0)
    }
}

/// A packed per-vertex terrain word.
///
/// Bits 0-1 mark roads, bits 2-6 hold the terrain type and bits 11-15 the
/// scene type selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TerrainWord(pub u16);

impl TerrainWord {
    pub const fn road(self) -> u16 {
        self.0 & 0x3
    }

    pub const fn is_road(self) -> bool {
        self.road() != 0
    }

    pub const fn terrain_type(self) -> u32 {
        (self.0 >> 2 & 0x1F) as u32
    }

    pub const fn scene_type(self) -> u32 {
        (self.0 >> 11) as u32
    }

    pub const fn pack(terrain_type: u32, scene_type: u32, road: u16) -> Self {
        Self(((scene_type as u16) << 11) | (((terrain_type as u16) & 0x1F) << 2) | (road & 0x3))
    }
}

/// Terrain and height data for one tile. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub id: TileId,
    /// 81 packed terrain words, x-major.
    pub terrain: Vec<u16>,
    /// 81 indices into the region's land height table, x-major.
    pub height: Vec<u8>,
}

impl Tile {
    /// Checks the record has a full 9x9 grid of terrain words and heights.
    pub fn validate(&self) -> Result<()> {
        let expected = VERTEX_DIM * VERTEX_DIM;
        if self.terrain.len() != expected {
            return Err(LandscapeError::MalformedTile {
                id: self.id,
                reason: format!("{} terrain words (expected {expected})", self.terrain.len()),
            });
        }
        if self.height.len() != expected {
            return Err(LandscapeError::MalformedTile {
                id: self.id,
                reason: format!("{} height indices (expected {expected})", self.height.len()),
            });
        }
        Ok(())
    }

    /// Terrain word at vertex `(x, y)`.
    #[inline]
    pub fn terrain_at(&self, x: usize, y: usize) -> TerrainWord {
        TerrainWord(self.terrain[x * VERTEX_DIM + y])
    }

    /// Height index at vertex `(x, y)`.
    #[inline]
    pub fn height_index_at(&self, x: usize, y: usize) -> u8 {
        self.height[x * VERTEX_DIM + y]
    }

    /// True if the cell containing the tile-local point is marked as road.
    pub fn on_road(&self, point: Vec2) -> bool {
        let cx = ((point.x / CELL_SIZE).floor() as i32).clamp(0, CELL_DIM as i32) as usize;
        let cy = ((point.y / CELL_SIZE).floor() as i32).clamp(0, CELL_DIM as i32) as usize;
        self.terrain_at(cx, cy).is_road()
    }
}

/// Placement of a model with a fixed frame inside a tile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StaticPlacement {
    pub model_id: u32,
    pub frame: Frame,
}

/// Companion record of a tile (`id - 1`): hand-placed objects and buildings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TileInfo {
    pub id: u32,
    #[serde(default)]
    pub objects: Vec<StaticPlacement>,
    #[serde(default)]
    pub buildings: Vec<StaticPlacement>,
}

/// Position and orientation relative to a tile (or cell) origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub origin: [f32; 3],
    /// Quaternion as `[x, y, z, w]`.
    #[serde(default = "identity_orientation")]
    pub orientation: [f32; 4],
}

fn identity_orientation() -> [f32; 4] {
    [0.0, 0.0, 0.0, 1.0]
}

impl Default for Frame {
    fn default() -> Self {
        Self {
            origin: [0.0; 3],
            orientation: identity_orientation(),
        }
    }
}

impl Frame {
    pub fn at(origin: Vec3) -> Self {
        Self {
            origin: origin.to_array(),
            ..default()
        }
    }

    pub fn origin(&self) -> Vec3 {
        Vec3::from_array(self.origin)
    }

    pub fn orientation(&self) -> Quat {
        Quat::from_array(self.orientation)
    }
}
