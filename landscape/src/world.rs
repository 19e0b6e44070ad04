//! World-data provider.
//!
//! The engine never reaches for a global "current world"; every operation is
//! handed a [`WorldData`] explicitly. [`WorldDataset`] is the in-memory
//! implementation, loadable from a RON file.

use std::collections::HashMap;
use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{LandscapeError, Result};
use crate::geometry::{GfxObjRecord, ModelData, ModelStore, SetupRecord};
use crate::region::{Region, Scene};
use crate::tile::{Tile, TileId, TileInfo};

/// Read access to decoded world records.
pub trait WorldData {
    fn region(&self) -> &Region;
    fn tile(&self, id: TileId) -> Result<&Tile>;
    fn tile_info(&self, id: TileId) -> Result<&TileInfo>;
    fn scene(&self, id: u32) -> Result<&Scene>;
}

/// On-disk layout of a world dataset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldFile {
    pub region: Region,
    #[serde(default)]
    pub tiles: Vec<Tile>,
    #[serde(default)]
    pub tile_infos: Vec<TileInfo>,
    #[serde(default)]
    pub scenes: Vec<Scene>,
    #[serde(default)]
    pub gfx_objs: Vec<GfxObjRecord>,
    #[serde(default)]
    pub setups: Vec<SetupRecord>,
}

/// World records indexed by id.
#[derive(Debug, Clone, Default)]
pub struct WorldDataset {
    region: Region,
    tiles: HashMap<TileId, Tile>,
    tile_infos: HashMap<u32, TileInfo>,
    scenes: HashMap<u32, Scene>,
    models: ModelStore,
}

impl WorldDataset {
    pub fn from_file_data(file: WorldFile) -> Self {
        Self {
            region: file.region,
            tiles: file.tiles.into_iter().map(|t| (t.id, t)).collect(),
            tile_infos: file.tile_infos.into_iter().map(|i| (i.id, i)).collect(),
            scenes: file.scenes.into_iter().map(|s| (s.id, s)).collect(),
            models: ModelStore::new(file.gfx_objs, file.setups),
        }
    }

    pub fn from_ron_str(text: &str) -> Result<Self> {
        let file: WorldFile = ron::from_str(text)?;
        Ok(Self::from_file_data(file))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let dataset = Self::from_ron_str(&text)?;
        info!(
            "Loaded world data from {:?}: {} tiles, {} scenes, {} models",
            path,
            dataset.tiles.len(),
            dataset.scenes.len(),
            dataset.models.gfx_objs.len() + dataset.models.setups.len()
        );
        Ok(dataset)
    }

    pub fn insert_tile(&mut self, tile: Tile) {
        self.tiles.insert(tile.id, tile);
    }

    pub fn insert_tile_info(&mut self, info: TileInfo) {
        self.tile_infos.insert(info.id, info);
    }

    pub fn insert_scene(&mut self, scene: Scene) {
        self.scenes.insert(scene.id, scene);
    }

    pub fn insert_gfx_obj(&mut self, record: GfxObjRecord) {
        self.models.gfx_objs.insert(record.id, record);
    }

    pub fn insert_setup(&mut self, record: SetupRecord) {
        self.models.setups.insert(record.id, record);
    }

    pub fn region_mut(&mut self) -> &mut Region {
        &mut self.region
    }

    /// Ids of every tile in the dataset, sorted.
    pub fn tile_ids(&self) -> Vec<TileId> {
        let mut ids: Vec<TileId> = self.tiles.keys().copied().collect();
        ids.sort();
        ids
    }
}

impl WorldData for WorldDataset {
    fn region(&self) -> &Region {
        &self.region
    }

    fn tile(&self, id: TileId) -> Result<&Tile> {
        self.tiles.get(&id).ok_or(LandscapeError::MissingTile(id))
    }

    fn tile_info(&self, id: TileId) -> Result<&TileInfo> {
        self.tile_infos
            .get(&id.info_id())
            .ok_or(LandscapeError::MissingTileInfo(id))
    }

    fn scene(&self, id: u32) -> Result<&Scene> {
        self.scenes.get(&id).ok_or(LandscapeError::MissingScene(id))
    }
}

impl ModelData for WorldDataset {
    fn gfx_obj(&self, id: u32) -> Result<&GfxObjRecord> {
        self.models.gfx_obj(id)
    }

    fn setup(&self, id: u32) -> Result<&SetupRecord> {
        self.models.setup(id)
    }
}
