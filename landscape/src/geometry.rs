//! Shared model geometry.
//!
//! A [`StaticMesh`] holds everything common to every instance of one model id.
//! Geometry comes from a [`ModelData`] provider and is memoized by
//! [`StaticMeshCache`], which is safe to share across threads once warm.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::bounds::BoundingBox;
use crate::error::{LandscapeError, Result};

/// Model id type byte for a single-part model.
pub const MODEL_TYPE_PART: u32 = 0x01;
/// Model id type byte for a multi-part setup.
pub const MODEL_TYPE_SETUP: u32 = 0x02;

/// Raw single-part model: a vertex array plus polygons as vertex-id loops.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GfxObjRecord {
    pub id: u32,
    pub vertices: Vec<[f32; 3]>,
    #[serde(default)]
    pub polygons: Vec<Vec<u16>>,
}

/// Raw multi-part model: an ordered list of part ids.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetupRecord {
    pub id: u32,
    pub parts: Vec<u32>,
}

/// Read access to raw model records.
pub trait ModelData {
    fn gfx_obj(&self, id: u32) -> Result<&GfxObjRecord>;
    fn setup(&self, id: u32) -> Result<&SetupRecord>;
}

/// Anything that can hand out shared meshes by model id.
pub trait GeometrySource {
    fn mesh(&self, model_id: u32) -> Result<Arc<StaticMesh>>;
}

/// One part of a model.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshPart {
    pub id: u32,
    pub vertices: Vec<Vec3>,
    pub polygons: Vec<Vec<u16>>,
}

/// Geometry shared by every instance of a model id.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticMesh {
    pub model_id: u32,
    pub parts: Vec<MeshPart>,
    /// Sum of the vertex counts of every part.
    pub total_vertices: usize,
    /// Lowest z of any vertex, for resting the model on the ground.
    pub lowest_z: f32,
    /// Bounds in model space.
    pub bounding_box: BoundingBox,
}

impl StaticMesh {
    /// Resolves a model id into its parts.
    ///
    /// Type `0x01` ids are a single part, type `0x02` ids list their parts.
    /// Any other type resolves to a mesh with no parts.
    pub fn load(model_id: u32, data: &dyn ModelData) -> Result<Self> {
        let part_ids = match model_id >> 24 {
            MODEL_TYPE_PART => vec![model_id],
            MODEL_TYPE_SETUP => data.setup(model_id)?.parts.clone(),
            _ => Vec::new(),
        };

        let parts = part_ids
            .into_iter()
            .map(|id| {
                let record = data.gfx_obj(id)?;
                Ok(MeshPart {
                    id,
                    vertices: record.vertices.iter().copied().map(Vec3::from_array).collect(),
                    polygons: record.polygons.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::from_parts(model_id, parts))
    }

    pub fn from_parts(model_id: u32, parts: Vec<MeshPart>) -> Self {
        let total_vertices = parts.iter().map(|p| p.vertices.len()).sum();
        let lowest_z = parts
            .iter()
            .flat_map(|p| p.vertices.iter())
            .fold(f32::MAX, |z, v| z.min(v.z));
        let bounding_box =
            BoundingBox::from_vertices(parts.iter().flat_map(|p| p.vertices.iter().copied()));

        Self {
            model_id,
            parts,
            total_vertices,
            lowest_z,
            bounding_box,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// All vertices of all parts, in part order.
    pub fn vertices(&self) -> impl Iterator<Item = &Vec3> {
        self.parts.iter().flat_map(|p| p.vertices.iter())
    }

    /// Line-list indices tracing every polygon as a closed loop.
    ///
    /// Indices address [`StaticMesh::vertices`]: each part's polygon ids are
    /// offset by the vertex count of the parts before it.
    pub fn wireframe_lines(&self) -> Vec<u32> {
        let mut lines = Vec::new();
        let mut offset = 0u32;

        for part in &self.parts {
            for poly in &part.polygons {
                for (i, &v) in poly.iter().enumerate() {
                    let next = poly[(i + 1) % poly.len()];
                    lines.push(v as u32 + offset);
                    lines.push(next as u32 + offset);
                }
            }
            offset += part.vertices.len() as u32;
        }

        lines
    }
}

/// Memoizing mesh cache over a [`ModelData`] provider.
pub struct StaticMeshCache<'a> {
    data: &'a (dyn ModelData + Sync),
    meshes: Mutex<HashMap<u32, Arc<StaticMesh>>>,
}

impl<'a> StaticMeshCache<'a> {
    pub fn new(data: &'a (dyn ModelData + Sync)) -> Self {
        Self {
            data,
            meshes: Mutex::new(HashMap::new()),
        }
    }

    /// Number of distinct models loaded so far.
    pub fn len(&self) -> usize {
        self.meshes.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl GeometrySource for StaticMeshCache<'_> {
    fn mesh(&self, model_id: u32) -> Result<Arc<StaticMesh>> {
        // A poisoned lock only means another thread panicked mid-insert; the map is still valid.
        let mut meshes = self.meshes.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(mesh) = meshes.get(&model_id) {
            return Ok(Arc::clone(mesh));
        }
        let mesh = Arc::new(StaticMesh::load(model_id, self.data)?);
        meshes.insert(model_id, Arc::clone(&mesh));
        Ok(mesh)
    }
}

/// Simple in-memory model store, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct ModelStore {
    pub gfx_objs: HashMap<u32, GfxObjRecord>,
    pub setups: HashMap<u32, SetupRecord>,
}

impl ModelStore {
    pub fn new(gfx_objs: Vec<GfxObjRecord>, setups: Vec<SetupRecord>) -> Self {
        Self {
            gfx_objs: gfx_objs.into_iter().map(|g| (g.id, g)).collect(),
            setups: setups.into_iter().map(|s| (s.id, s)).collect(),
        }
    }
}

impl ModelData for ModelStore {
    fn gfx_obj(&self, id: u32) -> Result<&GfxObjRecord> {
        self.gfx_objs.get(&id).ok_or(LandscapeError::MissingModel(id))
    }

    fn setup(&self, id: u32) -> Result<&SetupRecord> {
        self.setups.get(&id).ok_or(LandscapeError::MissingModel(id))
    }
}
