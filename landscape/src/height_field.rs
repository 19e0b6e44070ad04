//! Grid of vertex elevations.

use bevy::prelude::*;

use crate::error::Result;
use crate::region::Region;
use crate::tile::{Tile, VERTEX_DIM};

/// Elevation per mesh vertex, `width * height` samples, stored `x + y * width`.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightField {
    pub width: usize,
    pub height: usize,
    /// Tile grid coordinates of the south-west tile. Global cell coordinates of
    /// vertex `(x, y)` are `origin * 8 + (x, y)`; may be negative when the
    /// field hangs off the map edge.
    pub origin: IVec2,
    heights: Vec<f32>,
}

impl HeightField {
    /// A flat field of zero elevation.
    pub fn new(width: usize, height: usize, origin: IVec2) -> Self {
        Self {
            width,
            height,
            origin,
            heights: vec![0.0; width * height],
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.heights[x + y * self.width]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: f32) {
        self.heights[x + y * self.width] = value;
    }

    /// Number of cells along x.
    pub fn cells_x(&self) -> usize {
        self.width.saturating_sub(1)
    }

    /// Number of cells along y.
    pub fn cells_y(&self) -> usize {
        self.height.saturating_sub(1)
    }

    /// Global cell coordinates (wrapping) of local vertex/cell `(x, y)`.
    pub fn global_cell(&self, x: usize, y: usize) -> UVec2 {
        let base = self.origin * 8;
        UVec2::new(
            (base.x as u32).wrapping_add(x as u32),
            (base.y as u32).wrapping_add(y as u32),
        )
    }

    pub fn heights(&self) -> &[f32] {
        &self.heights
    }
}

/// The 9x9 vertex heights of a single tile, looked up in the land height table.
pub fn tile_vertex_heights(tile: &Tile, region: &Region) -> Result<HeightField> {
    tile.validate()?;
    let origin = IVec2::new(tile.id.x() as i32, tile.id.y() as i32);
    let mut field = HeightField::new(VERTEX_DIM, VERTEX_DIM, origin);
    for x in 0..VERTEX_DIM {
        for y in 0..VERTEX_DIM {
            field.set(x, y, region.land_height(tile.height_index_at(x, y))?);
        }
    }
    Ok(field)
}
