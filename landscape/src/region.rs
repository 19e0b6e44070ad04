//! Region tables: land heights and the terrain -> scene -> object lookups.

use serde::{Deserialize, Serialize};

use crate::error::{LandscapeError, Result};
use crate::tile::Frame;

/// Per-terrain-type scene table (grass, desert, volcano, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TerrainTypeInfo {
    #[serde(default)]
    pub name: String,
    /// Scene type selector -> scene info index.
    pub scene_types: Vec<u32>,
}

/// Ordered candidate scenes for one scene info entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneInfo {
    pub scenes: Vec<u32>,
}

/// Region-wide lookup tables. Read-only after load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Land height for each height index.
    pub height_table: Vec<f32>,
    pub terrain_types: Vec<TerrainTypeInfo>,
    pub scene_infos: Vec<SceneInfo>,
}

impl Region {
    /// Elevation for a height index.
    pub fn land_height(&self, index: u8) -> Result<f32> {
        self.height_table
            .get(index as usize)
            .copied()
            .ok_or(LandscapeError::HeightIndexOutOfRange(index))
    }

    /// Candidate scene ids for a terrain/scene type pair. May be empty.
    pub fn scene_candidates(&self, terrain_type: u32, scene_type: u32) -> Result<&[u32]> {
        let terrain = self
            .terrain_types
            .get(terrain_type as usize)
            .ok_or(LandscapeError::UnknownTerrainType { terrain_type })?;
        let scene_info = *terrain
            .scene_types
            .get(scene_type as usize)
            .ok_or(LandscapeError::UnknownSceneType {
                terrain_type,
                scene_type,
            })?;
        let info = self
            .scene_infos
            .get(scene_info as usize)
            .ok_or(LandscapeError::UnknownSceneInfo(scene_info))?;
        Ok(&info.scenes)
    }
}

/// A fixed list of decorative object descriptors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub id: u32,
    pub objects: Vec<ObjectDesc>,
}

/// One placeable object in a scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectDesc {
    pub model_id: u32,
    /// Base location (relative to the cell origin) and orientation.
    #[serde(default)]
    pub base_loc: Frame,
    /// Placement probability in `[0, 1]`.
    pub freq: f32,
    #[serde(default)]
    pub displace_x: f32,
    #[serde(default)]
    pub displace_y: f32,
    #[serde(default = "unit_scale")]
    pub min_scale: f32,
    #[serde(default = "unit_scale")]
    pub max_scale: f32,
    /// Maximum yaw in degrees.
    #[serde(default)]
    pub max_rotation: f32,
    /// Non-zero for objects spawned by the live world, never statically placed.
    #[serde(default)]
    pub dynamic_object: u32,
}

fn unit_scale() -> f32 {
    1.0
}

impl ObjectDesc {
    pub fn is_dynamic(&self) -> bool {
        self.dynamic_object != 0
    }
}
