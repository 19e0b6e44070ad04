//! Baked scenery database types.
//!
//! The offline `scenery_baker` tool writes `scenery.bin` using these types so
//! runtimes can spawn placements without re-running the placement pass.

use std::collections::BTreeMap;
use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{LandscapeError, Result};
use crate::landblock::{Landblock, LandscapeView};
use crate::model::ModelInstance;

pub const BAKED_SCENERY_VERSION: u32 = 1;

/// Versioned database of placements, keyed by raw tile id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BakedSceneryDb {
    pub version: u32,
    pub tiles: BTreeMap<u32, Vec<BakedPlacement>>,
}

/// One placement, in tile-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BakedPlacement {
    pub model_id: u32,
    pub position: [f32; 3],
    /// Full orientation (yaw composed with the base frame) as `[x, y, z, w]`.
    pub rotation: [f32; 4],
    pub scale: f32,
    /// Global cell coordinates.
    pub cell: [u32; 2],
}

impl From<&ModelInstance> for BakedPlacement {
    fn from(instance: &ModelInstance) -> Self {
        Self {
            model_id: instance.model_id,
            position: instance.position.to_array(),
            rotation: (instance.rotation * instance.frame.orientation()).to_array(),
            scale: instance.scale,
            cell: instance.cell.to_array(),
        }
    }
}

impl BakedPlacement {
    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_array(self.rotation)
    }
}

impl Default for BakedSceneryDb {
    fn default() -> Self {
        Self::new()
    }
}

impl BakedSceneryDb {
    pub fn new() -> Self {
        Self {
            version: BAKED_SCENERY_VERSION,
            tiles: BTreeMap::new(),
        }
    }

    /// Adds (or replaces) the scenery of one landblock.
    pub fn insert_landblock(&mut self, landblock: &Landblock) {
        self.tiles.insert(
            landblock.id.0,
            landblock.scenery.iter().map(BakedPlacement::from).collect(),
        );
    }

    pub fn from_view(view: &LandscapeView) -> Self {
        let mut db = Self::new();
        for (_, landblock) in &view.landblocks {
            db.insert_landblock(landblock);
        }
        db
    }

    pub fn placement_count(&self) -> usize {
        self.tiles.values().map(Vec::len).sum()
    }

    /// Load from bytes (bincode), rejecting other versions.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let db: BakedSceneryDb = bincode::deserialize(bytes)?;
        if db.version != BAKED_SCENERY_VERSION {
            return Err(LandscapeError::UnsupportedVersion {
                found: db.version,
                expected: BAKED_SCENERY_VERSION,
            });
        }
        Ok(db)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_bytes(&std::fs::read(path)?)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Writes the database, returning the number of bytes written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<usize> {
        let bytes = self.to_bytes()?;
        std::fs::write(path, &bytes)?;
        Ok(bytes.len())
    }
}
