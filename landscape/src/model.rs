//! Placed model instances.
//!
//! A [`ModelInstance`] pairs shared [`StaticMesh`] geometry with one placement
//! (position, yaw, uniform scale) in tile-local coordinates. Static objects,
//! buildings and generated scenery all end up as instances.

use std::sync::Arc;

use bevy::prelude::*;

use crate::bounds::BoundingBox;
use crate::geometry::StaticMesh;
use crate::tile::{Frame, StaticPlacement, TileId, CELL_DIM, CELL_SIZE};

/// Degrees to radians, negated: headings turn clockwise seen from above.
pub const HEADING_TO_RADIANS: f32 = -0.0174533;

/// One placed model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInstance {
    pub model_id: u32,
    pub mesh: Arc<StaticMesh>,
    /// Base frame the placement started from; its orientation is kept.
    pub frame: Frame,
    /// Tile-local position.
    pub position: Vec3,
    pub heading_degrees: f32,
    /// Yaw built from `heading_degrees`.
    pub rotation: Quat,
    pub scale: f32,
    /// Global cell coordinates of the cell the placement came from.
    pub cell: UVec2,
    /// Bounds of the transformed vertices.
    pub bounding_box: BoundingBox,
}

impl ModelInstance {
    pub fn new(
        mesh: Arc<StaticMesh>,
        frame: Frame,
        position: Vec3,
        heading_degrees: f32,
        scale: f32,
        cell: UVec2,
    ) -> Self {
        let mut instance = Self {
            model_id: mesh.model_id,
            mesh,
            frame,
            position,
            heading_degrees,
            rotation: heading_rotation(heading_degrees),
            scale,
            cell,
            bounding_box: BoundingBox::EMPTY,
        };
        instance.bounding_box = BoundingBox::from_vertices(instance.world_vertices());
        instance
    }

    /// A hand-placed object or building: positioned at its frame origin,
    /// unrotated beyond the frame, unit scale.
    pub fn from_placement(mesh: Arc<StaticMesh>, placement: &StaticPlacement, tile: TileId) -> Self {
        let position = placement.frame.origin();
        let cell = tile.cell_origin() + local_cell(position.truncate());
        Self::new(mesh, placement.frame, position, 0.0, 1.0, cell)
    }

    /// `translate(position) * rotate(rotation * frame orientation) * scale`.
    pub fn transform(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.scale),
            self.rotation * self.frame.orientation(),
            self.position,
        )
    }

    /// Every mesh vertex in tile-local space.
    pub fn world_vertices(&self) -> impl Iterator<Item = Vec3> + '_ {
        let transform = self.transform();
        self.mesh.vertices().map(move |v| transform.transform_point3(*v))
    }
}

/// Yaw quaternion for a heading in degrees.
pub fn heading_rotation(heading_degrees: f32) -> Quat {
    Quat::from_rotation_z(heading_degrees * HEADING_TO_RADIANS)
}

/// Cell within a tile holding a tile-local point, clamped to `[0, 7]`.
pub fn local_cell(point: Vec2) -> UVec2 {
    let max = CELL_DIM as i32 - 1;
    UVec2::new(
        ((point.x / CELL_SIZE).floor() as i32).clamp(0, max) as u32,
        ((point.y / CELL_SIZE).floor() as i32).clamp(0, max) as u32,
    )
}
