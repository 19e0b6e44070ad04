//! Axis-aligned bounding boxes for placed models.
//!
//! Overlap tests only look at the XY plane: two objects stacked vertically
//! still count as colliding for placement purposes.

use bevy::prelude::*;

/// An axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    /// An inverted box that any point will expand.
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::MAX),
        max: Vec3::splat(f32::MIN),
    };

    pub const fn empty() -> Self {
        Self::EMPTY
    }

    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Min/max reduction over a set of (already transformed) vertices.
    pub fn from_vertices<I>(vertices: I) -> Self
    where
        I: IntoIterator<Item = Vec3>,
    {
        vertices.into_iter().fold(Self::EMPTY, |mut bbox, v| {
            bbox.min = bbox.min.min(v);
            bbox.max = bbox.max.max(v);
            bbox
        })
    }

    /// Min/max reduction over vertices transformed by `transform`.
    pub fn from_points_transformed<'a, I>(points: I, transform: Mat4) -> Self
    where
        I: IntoIterator<Item = &'a Vec3>,
    {
        Self::from_vertices(points.into_iter().map(|p| transform.transform_point3(*p)))
    }

    /// True if no vertex was ever added.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec3 {
        self.min + self.size() / 2.0
    }

    /// Scales the box by `factor` around its center.
    pub fn scale(&mut self, factor: f32) {
        let center = self.center();
        let half = self.size() / 2.0 * factor;
        self.min = center - half;
        self.max = center + half;
    }

    /// Makes the box a cube of side `size` around its center.
    pub fn resize(&mut self, size: f32) {
        let center = self.center();
        let half = Vec3::splat(size / 2.0);
        self.min = center - half;
        self.max = center + half;
    }

    /// Inclusive point containment on all three axes.
    pub fn contains(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Separating-axis test on X and Y. Z is ignored.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// The 8 corner points.
    pub fn corners(&self) -> [Vec3; 8] {
        let (min, max) = (self.min, self.max);
        [
            Vec3::new(min.x, min.y, max.z),
            Vec3::new(max.x, min.y, max.z),
            Vec3::new(min.x, min.y, min.z),
            Vec3::new(max.x, min.y, min.z),
            Vec3::new(min.x, max.y, max.z),
            Vec3::new(max.x, max.y, max.z),
            Vec3::new(min.x, max.y, min.z),
            Vec3::new(max.x, max.y, min.z),
        ]
    }
}
