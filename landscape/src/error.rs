//! Error type shared by every landscape operation.
//!
//! Missing or malformed world-data records are fatal to the tile being
//! processed. Callers decide whether to skip the tile and continue.

use thiserror::Error;

use crate::tile::TileId;

#[derive(Debug, Error)]
pub enum LandscapeError {
    #[error("tile record {0} not found")]
    MissingTile(TileId),
    #[error("tile info record {0} not found")]
    MissingTileInfo(TileId),
    #[error("scene {0:#010X} not found")]
    MissingScene(u32),
    #[error("model {0:#010X} not found")]
    MissingModel(u32),
    #[error("malformed tile {id}: {reason}")]
    MalformedTile { id: TileId, reason: String },
    #[error("terrain type {terrain_type} is not in the region table")]
    UnknownTerrainType { terrain_type: u32 },
    #[error("scene type {scene_type} is not defined for terrain type {terrain_type}")]
    UnknownSceneType { terrain_type: u32, scene_type: u32 },
    #[error("scene info {0} is not in the region table")]
    UnknownSceneInfo(u32),
    #[error("height index {0} is outside the land height table")]
    HeightIndexOutOfRange(u8),
    #[error("unsupported version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("Serialization error: {0}")]
    Bincode(#[from] bincode::Error),
}

impl LandscapeError {
    /// True for the "missing record" family (unknown ids in the world data).
    pub fn is_missing_record(&self) -> bool {
        matches!(
            self,
            LandscapeError::MissingTile(_)
                | LandscapeError::MissingTileInfo(_)
                | LandscapeError::MissingScene(_)
                | LandscapeError::MissingModel(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, LandscapeError>;
