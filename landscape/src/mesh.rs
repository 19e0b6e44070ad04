//! Ground mesh triangulation.
//!
//! Every grid cell is split into two triangles along a diagonal chosen by
//! [`split_direction`] of the cell's *global* coordinates, so neighbouring
//! meshes built independently agree along their shared edges.

use bevy::prelude::*;

use crate::hash::{split_direction, SplitDirection};
use crate::height_field::HeightField;
use crate::tile::CELL_SIZE;

/// Anything that can answer "how high is the ground at (x, y)".
pub trait GroundHeight {
    fn height_at(&self, point: Vec2) -> f32;
}

/// Three indices into a mesh's vertex list, clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Triangle {
    pub indices: [u32; 3],
}

impl Triangle {
    pub fn new(a: u32, b: u32, c: u32) -> Self {
        Self { indices: [a, b, c] }
    }

    pub fn points(&self, vertices: &[Vec3]) -> [Vec3; 3] {
        self.indices.map(|i| vertices[i as usize])
    }

    pub fn centroid(&self, vertices: &[Vec3]) -> Vec3 {
        let [a, b, c] = self.points(vertices);
        (a + b + c) / 3.0
    }

    /// 2D containment test on the XY projection, edges inclusive.
    pub fn contains(&self, point: Vec2, vertices: &[Vec3]) -> bool {
        let [a, b, c] = self.points(vertices).map(|v| v.truncate());
        let d1 = edge_side(point, a, b);
        let d2 = edge_side(point, b, c);
        let d3 = edge_side(point, c, a);

        let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
        let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
        !(has_neg && has_pos)
    }

    /// Z of the triangle's plane at `point`.
    pub fn height_at(&self, point: Vec2, vertices: &[Vec3]) -> f32 {
        let [a, b, c] = self.points(vertices);
        let normal = (b - a).cross(c - a);
        if normal.z == 0.0 {
            return (a.z + b.z + c.z) / 3.0;
        }
        a.z - (normal.x * (point.x - a.x) + normal.y * (point.y - a.y)) / normal.z
    }
}

#[inline]
fn edge_side(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    (p.x - b.x) * (a.y - b.y) - (a.x - b.x) * (p.y - b.y)
}

/// A triangulated height grid. Built once, read-only afterwards.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertices: Vec<Vec3>,
    pub triangles: Vec<Triangle>,
    cells_x: usize,
    cells_y: usize,
    splits: Vec<SplitDirection>,
}

impl Mesh {
    /// Triangulates a height field.
    ///
    /// Vertex `(x, y)` sits at `(x * 24, y * 24, height[x, y])` with index
    /// `x + y * width`. Cell `(cx, cy)` owns triangles `2 * (cx + cy * cells_x)`
    /// and the one after it.
    pub fn build(field: &HeightField) -> Self {
        let width = field.width;
        let cells_x = field.cells_x();
        let cells_y = field.cells_y();

        let mut vertices = Vec::with_capacity(field.width * field.height);
        for y in 0..field.height {
            for x in 0..field.width {
                vertices.push(Vec3::new(
                    x as f32 * CELL_SIZE,
                    y as f32 * CELL_SIZE,
                    field.get(x, y),
                ));
            }
        }

        let mut triangles = Vec::with_capacity(cells_x * cells_y * 2);
        let mut splits = Vec::with_capacity(cells_x * cells_y);
        for cy in 0..cells_y {
            for cx in 0..cells_x {
                let lower_left = (cx + cy * width) as u32;
                let lower_right = lower_left + 1;
                let top_left = (cx + (cy + 1) * width) as u32;
                let top_right = top_left + 1;

                let global = field.global_cell(cx, cy);
                let split = split_direction(global.x, global.y);
                match split {
                    SplitDirection::NwSe => {
                        triangles.push(Triangle::new(top_left, lower_right, lower_left));
                        triangles.push(Triangle::new(top_left, top_right, lower_right));
                    }
                    SplitDirection::NeSw => {
                        triangles.push(Triangle::new(top_right, lower_right, lower_left));
                        triangles.push(Triangle::new(top_right, lower_left, top_left));
                    }
                }
                splits.push(split);
            }
        }

        Self {
            vertices,
            triangles,
            cells_x,
            cells_y,
            splits,
        }
    }

    pub fn cells_x(&self) -> usize {
        self.cells_x
    }

    pub fn cells_y(&self) -> usize {
        self.cells_y
    }

    /// Extent of the mesh in world units along x and y.
    pub fn extent(&self) -> Vec2 {
        Vec2::new(self.cells_x as f32, self.cells_y as f32) * CELL_SIZE
    }

    /// Cell containing a point, clamped to the valid cell range.
    pub fn cell_at(&self, point: Vec2) -> UVec2 {
        let max_x = self.cells_x.saturating_sub(1) as i64;
        let max_y = self.cells_y.saturating_sub(1) as i64;
        let cx = ((point.x / CELL_SIZE).floor() as i64).clamp(0, max_x);
        let cy = ((point.y / CELL_SIZE).floor() as i64).clamp(0, max_y);
        UVec2::new(cx as u32, cy as u32)
    }

    /// The two triangles of a cell.
    pub fn cell_triangles(&self, cx: usize, cy: usize) -> [Triangle; 2] {
        let offset = (cx + cy * self.cells_x) * 2;
        [self.triangles[offset], self.triangles[offset + 1]]
    }

    /// Split direction chosen for a cell.
    pub fn split_at(&self, cx: usize, cy: usize) -> SplitDirection {
        self.splits[cx + cy * self.cells_x]
    }

    /// The diagonal edge shared by a cell's two triangles.
    pub fn splitter(&self, cx: usize, cy: usize) -> (Vec3, Vec3) {
        let [first, _] = self.cell_triangles(cx, cy);
        let [a, b, c] = first.points(&self.vertices);
        match self.split_at(cx, cy) {
            // top-left to lower-right
            SplitDirection::NwSe => (a, b),
            // top-right to lower-left
            SplitDirection::NeSw => (a, c),
        }
    }

    /// Triangle whose XY projection contains the point. Points outside the
    /// mesh are clamped onto it first. `None` only for a mesh with no cells.
    pub fn triangle_containing(&self, point: Vec2) -> Option<Triangle> {
        if self.triangles.is_empty() {
            return None;
        }
        let point = self.clamp_point(point);
        let cell = self.cell_at(point);
        let [first, second] = self.cell_triangles(cell.x as usize, cell.y as usize);
        if first.contains(point, &self.vertices) {
            Some(first)
        } else {
            Some(second)
        }
    }

    fn clamp_point(&self, point: Vec2) -> Vec2 {
        point.clamp(Vec2::ZERO, self.extent())
    }

    /// Flat index buffer, three indices per triangle.
    pub fn indices(&self) -> Vec<u32> {
        self.triangles.iter().flat_map(|t| t.indices).collect()
    }
}

impl GroundHeight for Mesh {
    fn height_at(&self, point: Vec2) -> f32 {
        let point = self.clamp_point(point);
        match self.triangle_containing(point) {
            Some(triangle) => triangle.height_at(point, &self.vertices),
            // A field narrower than 2x2 has vertices but no cells
            None => self
                .vertices
                .iter()
                .min_by(|a, b| {
                    let da = a.truncate().distance_squared(point);
                    let db = b.truncate().distance_squared(point);
                    da.total_cmp(&db)
                })
                .map_or(0.0, |v| v.z),
        }
    }
}
