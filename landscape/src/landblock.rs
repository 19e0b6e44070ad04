//! Per-tile aggregate and multi-tile view.
//!
//! A [`Landblock`] is everything needed to draw or collide against one tile:
//! its ground mesh, hand-placed objects, buildings and generated scenery.

use bevy::prelude::*;

use crate::block_range::BlockRange;
use crate::config::{LandscapeConfig, SceneryConfig};
use crate::error::Result;
use crate::geometry::GeometrySource;
use crate::height_field::tile_vertex_heights;
use crate::mesh::Mesh;
use crate::model::ModelInstance;
use crate::scenery::SceneryPlacer;
use crate::tile::{StaticPlacement, TileId, TILE_SIZE};
use crate::world::WorldData;

/// One fully loaded tile.
#[derive(Debug, Clone)]
pub struct Landblock {
    pub id: TileId,
    /// 9x9 ground mesh in tile-local coordinates.
    pub mesh: Mesh,
    pub objects: Vec<ModelInstance>,
    pub buildings: Vec<ModelInstance>,
    pub scenery: Vec<ModelInstance>,
}

impl Landblock {
    /// Loads a tile and populates it. Any missing record fails the tile.
    pub fn load(
        world: &dyn WorldData,
        geometry: &dyn GeometrySource,
        id: TileId,
        config: &SceneryConfig,
    ) -> Result<Self> {
        let tile = world.tile(id)?;
        let info = world.tile_info(id)?;
        let mesh = Mesh::build(&tile_vertex_heights(tile, world.region())?);

        let objects = instances(geometry, &info.objects, id)?;
        let buildings = instances(geometry, &info.buildings, id)?;
        let scenery = SceneryPlacer::new(world, geometry, config).place(tile, &mesh, &buildings)?;

        Ok(Self {
            id,
            mesh,
            objects,
            buildings,
            scenery,
        })
    }

    /// Objects, buildings and scenery, in that order.
    pub fn instances(&self) -> impl Iterator<Item = &ModelInstance> {
        self.objects
            .iter()
            .chain(self.buildings.iter())
            .chain(self.scenery.iter())
    }

    pub fn total_vertices(&self) -> usize {
        self.instances().map(|i| i.mesh.total_vertices).sum()
    }
}

fn instances(
    geometry: &dyn GeometrySource,
    placements: &[StaticPlacement],
    tile: TileId,
) -> Result<Vec<ModelInstance>> {
    placements
        .iter()
        .map(|p| Ok(ModelInstance::from_placement(geometry.mesh(p.model_id)?, p, tile)))
        .collect()
}

/// A square range of tiles: one stitched ground mesh plus each tile's
/// landblock.
#[derive(Debug, Clone)]
pub struct LandscapeView {
    pub range: BlockRange,
    /// Ground mesh of the whole range; slot `(0, 0)` sits at the origin.
    pub mesh: Mesh,
    /// Landblocks that loaded, in slot order, with their slot coordinates.
    pub landblocks: Vec<(UVec2, Landblock)>,
}

impl LandscapeView {
    /// Assembles the range around `config.center`.
    ///
    /// The height field needs every in-range tile, so a missing tile fails
    /// the view. Past that, a tile whose objects or scenery fail to load is
    /// skipped with a warning.
    pub fn load(
        world: &dyn WorldData,
        geometry: &dyn GeometrySource,
        config: &LandscapeConfig,
    ) -> Result<Self> {
        let range = BlockRange::assemble(world, config.center, config.radius)?;
        let mesh = Mesh::build(&range.height_field);

        let mut landblocks = Vec::new();
        for (slot, id) in range.tiles() {
            match Landblock::load(world, geometry, id, &config.scenery) {
                Ok(landblock) => landblocks.push((slot, landblock)),
                Err(err) => warn!("Skipping tile {}: {}", id, err),
            }
        }

        info!(
            "Loaded landscape around {} (radius {}): {} landblocks, {} scenery objects",
            config.center,
            config.radius,
            landblocks.len(),
            landblocks.iter().map(|(_, lb)| lb.scenery.len()).sum::<usize>()
        );

        Ok(Self {
            range,
            mesh,
            landblocks,
        })
    }

    /// Offset of a slot's tile-local coordinates within the view's mesh.
    pub fn slot_offset(slot: UVec2) -> Vec3 {
        (slot.as_vec2() * TILE_SIZE).extend(0.0)
    }

    pub fn landblock(&self, id: TileId) -> Option<&Landblock> {
        self.landblocks
            .iter()
            .find(|(_, lb)| lb.id == id)
            .map(|(_, lb)| lb)
    }
}
