//! Deterministic terrain meshes and scenery placement for a tile-based world.
//!
//! Shared by every consumer that needs to agree on the ground and on where
//! scenery stands: renderers, servers and the offline `scenery_baker` tool.

pub mod baked;
pub mod block_range;
pub mod bounds;
pub mod config;
pub mod error;
pub mod geometry;
pub mod hash;
pub mod height_field;
pub mod landblock;
pub mod mesh;
pub mod model;
pub mod region;
pub mod scenery;
pub mod tile;
pub mod world;

#[cfg(test)]
mod test_support;

pub use baked::{BakedPlacement, BakedSceneryDb, BAKED_SCENERY_VERSION};
pub use block_range::{assemble, BlockRange};
pub use bounds::BoundingBox;
pub use config::{CollisionPolicy, LandscapeConfig, SceneryConfig};
pub use error::{LandscapeError, Result};
pub use geometry::{GeometrySource, ModelData, ModelStore, StaticMesh, StaticMeshCache};
pub use hash::SplitDirection;
pub use height_field::{tile_vertex_heights, HeightField};
pub use landblock::{Landblock, LandscapeView};
pub use mesh::{GroundHeight, Mesh, Triangle};
pub use model::ModelInstance;
pub use region::{ObjectDesc, Region, Scene};
pub use scenery::{place, SceneryPlacer};
pub use tile::{Frame, TerrainWord, Tile, TileId, TileInfo};
pub use world::{WorldData, WorldDataset, WorldFile};
