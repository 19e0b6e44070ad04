//! Placement and landscape configuration, loadable from RON.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::tile::TileId;

/// Which already-placed objects block a new scenery placement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollisionPolicy {
    /// Overlaps are allowed.
    #[default]
    Disabled,
    /// Reject scenery whose bounds overlap a building on the same tile.
    Buildings,
    /// Reject overlaps with buildings or previously placed scenery.
    BuildingsAndScenery,
}

/// Tunables for scenery placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneryConfig {
    /// Hard cap on placements per tile.
    pub max_objects: usize,
    pub collision: CollisionPolicy,
    /// Drop placements whose model resolves to no geometry.
    pub skip_empty_models: bool,
}

impl Default for SceneryConfig {
    fn default() -> Self {
        Self {
            max_objects: 300,
            collision: CollisionPolicy::Disabled,
            skip_empty_models: true,
        }
    }
}

impl SceneryConfig {
    pub fn from_ron_str(text: &str) -> Result<Self> {
        Ok(ron::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_ron_str(&std::fs::read_to_string(path)?)
    }
}

/// A range of tiles to load, and how to populate them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandscapeConfig {
    pub center: TileId,
    #[serde(default)]
    pub radius: u32,
    #[serde(default)]
    pub scenery: SceneryConfig,
}

impl LandscapeConfig {
    pub fn new(center: TileId, radius: u32) -> Self {
        Self {
            center,
            radius,
            scenery: SceneryConfig::default(),
        }
    }

    pub fn from_ron_str(text: &str) -> Result<Self> {
        Ok(ron::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_ron_str(&std::fs::read_to_string(path)?)
    }
}
