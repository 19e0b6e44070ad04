//! Assembles a square range of tiles into one height field.
//!
//! Adjacent tiles share their border row/column of vertices, so tile slot
//! `(tx, ty)` lands at vertex origin `(tx * 8, ty * 8)` and the assembled field
//! is `(dim * 8 + 1)` vertices on a side. A shared vertex is written once, by
//! the first present tile in slot order (x-major) that covers it. Slots that
//! fall off the map stay empty and contribute zero height.

use bevy::prelude::*;

use crate::error::Result;
use crate::hash::{split_direction, SplitDirection};
use crate::height_field::HeightField;
use crate::tile::{TileId, CELL_DIM, VERTEX_DIM};
use crate::world::WorldData;

/// A `(2 * radius + 1)^2` range of tiles centered on one tile.
#[derive(Debug, Clone)]
pub struct BlockRange {
    pub center: TileId,
    pub radius: u32,
    /// Tile grid coordinates of slot `(0, 0)`, the south-west corner.
    pub origin: IVec2,
    /// Tile id per slot, `x * dim + y`; `None` for slots off the map.
    slots: Vec<Option<TileId>>,
    pub height_field: HeightField,
}

impl BlockRange {
    /// Loads every in-range tile around `center` and stitches their heights.
    ///
    /// Slots outside `[0, 255]^2` are skipped. A missing or malformed tile
    /// record fails the whole range.
    pub fn assemble(world: &dyn WorldData, center: TileId, radius: u32) -> Result<Self> {
        let dim = radius as usize * 2 + 1;
        let origin = IVec2::new(
            center.x() as i32 - radius as i32,
            center.y() as i32 - radius as i32,
        );

        let mut slots = Vec::with_capacity(dim * dim);
        for x in 0..dim {
            for y in 0..dim {
                let dx = x as i32 - radius as i32;
                let dy = y as i32 - radius as i32;
                let slot = center.offset(dx, dy);
                if slot.is_none() {
                    info!(
                        "Tile slot ({}, {}) around {} is off the map, skipping",
                        x, y, center
                    );
                }
                slots.push(slot);
            }
        }

        let size = dim * CELL_DIM + 1;
        let mut height_field = HeightField::new(size, size, origin);
        let mut written = vec![false; size * size];
        let region = world.region();

        for tx in 0..dim {
            for ty in 0..dim {
                let Some(id) = slots[tx * dim + ty] else { continue };
                let tile = world.tile(id)?;
                tile.validate()?;

                for x in 0..VERTEX_DIM {
                    for y in 0..VERTEX_DIM {
                        let hx = tx * CELL_DIM + x;
                        let hy = ty * CELL_DIM + y;
                        if written[hx + hy * size] {
                            continue;
                        }
                        height_field.set(hx, hy, region.land_height(tile.height_index_at(x, y))?);
                        written[hx + hy * size] = true;
                    }
                }
            }
        }

        Ok(Self {
            center,
            radius,
            origin,
            slots,
            height_field,
        })
    }

    /// Slots per side.
    pub fn dim(&self) -> usize {
        self.radius as usize * 2 + 1
    }

    /// Tile id at slot `(x, y)`, `None` if the slot is off the map.
    pub fn slot(&self, x: usize, y: usize) -> Option<TileId> {
        self.slots[x * self.dim() + y]
    }

    /// Present tiles in slot order, with their slot coordinates.
    pub fn tiles(&self) -> impl Iterator<Item = (UVec2, TileId)> + '_ {
        let dim = self.dim();
        self.slots
            .iter()
            .enumerate()
            .filter_map(move |(i, slot)| slot.map(|id| (UVec2::new((i / dim) as u32, (i % dim) as u32), id)))
    }

    /// Split direction of a cell given in coordinates local to the assembled
    /// field. Matches [`crate::mesh::Mesh::split_at`] on a mesh of this field.
    pub fn split_direction(&self, local_x: usize, local_y: usize) -> SplitDirection {
        let global = self.height_field.global_cell(local_x, local_y);
        split_direction(global.x, global.y)
    }
}

/// Height field for the tiles within `radius` of `center`.
pub fn assemble(world: &dyn WorldData, center: TileId, radius: u32) -> Result<HeightField> {
    BlockRange::assemble(world, center, radius).map(|range| range.height_field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LandscapeError;
    use crate::mesh::Mesh;
    use crate::test_support::{flat_tile, world_with_tiles};

    #[test]
    fn test_single_tile_assembly() {
        let id = TileId::from_xy(10, 20);
        let mut tile = flat_tile(id, 0);
        tile.height[2 * 9 + 3] = 7;
        let world = world_with_tiles(vec![tile]);

        let range = BlockRange::assemble(&world, id, 0).unwrap();
        assert_eq!(range.dim(), 1);
        assert_eq!(range.origin, IVec2::new(10, 20));
        let field = &range.height_field;
        assert_eq!((field.width, field.height), (9, 9));
        assert_eq!(field.get(2, 3), 7.0 * 2.0);
        assert_eq!(field.get(3, 2), 0.0);
    }

    #[test]
    fn test_stitching_places_tiles_on_shared_edges() {
        let center = TileId::from_xy(50, 50);
        let mut tiles = Vec::new();
        for dx in -1..=1 {
            for dy in -1..=1 {
                let id = center.offset(dx, dy).unwrap();
                // Height index encodes the slot so we can tell tiles apart
                tiles.push(flat_tile(id, ((dx + 1) * 3 + (dy + 1) + 1) as u8));
            }
        }
        let world = world_with_tiles(tiles);
        let field = assemble(&world, center, 1).unwrap();

        assert_eq!((field.width, field.height), (25, 25));
        // Interior of slot (1, 1) (the center tile: index 5)
        assert_eq!(field.get(12, 12), 10.0);
        // Interior of slot (2, 0): index 7
        assert_eq!(field.get(20, 4), 14.0);
        // Shared edge between slot (0, 0) and (1, 0) belongs to slot (0, 0)
        assert_eq!(field.get(8, 4), 2.0);
        // Far corner belongs to slot (2, 2): index 9
        assert_eq!(field.get(24, 24), 18.0);
    }

    #[test]
    fn test_off_map_slots_contribute_zero() {
        let center = TileId::from_xy(0, 0);
        let mut tiles = Vec::new();
        for (dx, dy) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            tiles.push(flat_tile(center.offset(dx, dy).unwrap(), 3));
        }
        let world = world_with_tiles(tiles);
        let range = BlockRange::assemble(&world, center, 1).unwrap();

        assert_eq!(range.origin, IVec2::new(-1, -1));
        assert_eq!(range.slot(0, 0), None);
        assert_eq!(range.slot(1, 1), Some(center));
        assert_eq!(range.tiles().count(), 4);

        let field = &range.height_field;
        assert_eq!(field.get(4, 4), 0.0);
        assert_eq!(field.get(4, 12), 0.0);
        // Edge shared with an absent slot still carries the present tile's height
        assert_eq!(field.get(8, 12), 6.0);
        assert_eq!(field.get(12, 12), 6.0);
    }

    #[test]
    fn test_missing_tile_fails_the_range() {
        let center = TileId::from_xy(7, 7);
        let world = world_with_tiles(vec![flat_tile(center, 0)]);
        assert!(matches!(
            BlockRange::assemble(&world, center, 1),
            Err(LandscapeError::MissingTile(_))
        ));
    }

    #[test]
    fn test_split_direction_matches_mesh() {
        let center = TileId::from_xy(40, 41);
        let mut tiles = Vec::new();
        for dx in -1..=1 {
            for dy in -1..=1 {
                tiles.push(flat_tile(center.offset(dx, dy).unwrap(), 1));
            }
        }
        let world = world_with_tiles(tiles);
        let range = BlockRange::assemble(&world, center, 1).unwrap();
        let mesh = Mesh::build(&range.height_field);

        for x in 0..24 {
            for y in 0..24 {
                assert_eq!(range.split_direction(x, y), mesh.split_at(x, y));
            }
        }
        // Local cell (8, 8) is cell (0, 0) of the center tile
        assert_eq!(
            range.split_direction(8, 8),
            split_direction(40 * 8, 41 * 8)
        );
    }
}
