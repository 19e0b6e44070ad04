//! Placement hashes.
//!
//! Every pseudo-random decision made while building terrain and scenery is a
//! pure function of global cell coordinates, computed with wrapping 32-bit
//! unsigned arithmetic. Other consumers of the same world data compute the
//! exact same bits, so none of these constants may be changed or reordered.
//!
//! Global cell coordinates are `tile_coord * 8 + local_cell`.

/// Scales a 32-bit hash into `[0, 1)`. Slightly less than 2^-32.
pub const UNIT_SCALE: f64 = 2.3283064e-10;

const SPLIT_XY: u32 = 0x0CCA_C033;
const SPLIT_X: u32 = 0x421B_E3BD;
const SPLIT_Y: u32 = 0x6C1A_C587;
const SPLIT_BIAS: u32 = 0x519B_8F25;

const SCENE_XY: u32 = 712_977_289;
const SCENE_BIAS: u32 = 2_139_937_281;

const CELL_X: u32 = 1_109_124_029;
const CELL_Y: u32 = 1_813_693_831;
const CELL_XY: u32 = 1_360_117_743;
const CELL_BIAS: u32 = 1_888_038_839;

const QUADRANT_XY: u32 = 1_870_387_557;
const QUADRANT_BIAS: u32 = 402_451_965;

/// Seed offsets for the per-object hashes. Each derived value uses its own
/// offset so the values are decorrelated.
pub mod offset {
    pub const FREQUENCY: u32 = 23_399;
    pub const DISPLACE_X: u32 = 45_773;
    pub const DISPLACE_Y: u32 = 72_719;
    pub const SCALE: u32 = 32_593;
    pub const ROTATION: u32 = 63_127;
}

/// Which diagonal divides a grid cell into two triangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SplitDirection {
    /// Diagonal from the north-west corner (top-left) to the south-east corner (lower-right).
    NwSe,
    /// Diagonal from the north-east corner (top-right) to the south-west corner (lower-left).
    NeSw,
}

/// Raw split hash for a global cell.
#[inline]
pub fn split_hash(x: u32, y: u32) -> u32 {
    x.wrapping_mul(y)
        .wrapping_mul(SPLIT_XY)
        .wrapping_sub(x.wrapping_mul(SPLIT_X))
        .wrapping_add(y.wrapping_mul(SPLIT_Y))
        .wrapping_sub(SPLIT_BIAS)
}

/// Split direction of a global cell: the sign bit of [`split_hash`].
#[inline]
pub fn split_direction(x: u32, y: u32) -> SplitDirection {
    if split_hash(x, y) & 0x8000_0000 != 0 {
        SplitDirection::NeSw
    } else {
        SplitDirection::NwSe
    }
}

/// Hash used to pick one scene out of a cell's candidate list.
#[inline]
pub fn scene_hash(x: u32, y: u32) -> u32 {
    y.wrapping_mul(SCENE_XY.wrapping_mul(x).wrapping_add(CELL_Y))
        .wrapping_sub(CELL_X.wrapping_mul(x))
        .wrapping_add(SCENE_BIAS)
}

/// Per-object hash for object `k` of a cell's scene, with one of the
/// [`offset`] seeds.
#[inline]
pub fn object_hash(x: u32, y: u32, k: u32, seed: u32) -> u32 {
    let cell = CELL_XY.wrapping_mul(x).wrapping_mul(y).wrapping_add(CELL_BIAS);
    CELL_Y
        .wrapping_mul(y)
        .wrapping_sub(k.wrapping_add(seed).wrapping_mul(cell))
        .wrapping_sub(CELL_X.wrapping_mul(x))
}

/// Hash choosing the 90 degree quadrant a displaced offset is rotated into.
#[inline]
pub fn quadrant_hash(x: u32, y: u32) -> u32 {
    CELL_Y
        .wrapping_mul(y)
        .wrapping_sub(x.wrapping_mul(QUADRANT_XY.wrapping_mul(y).wrapping_add(CELL_X)))
        .wrapping_sub(QUADRANT_BIAS)
}

/// Maps a hash into `[0, 1)` in double precision.
#[inline]
pub fn unit(hash: u32) -> f64 {
    hash as f64 * UNIT_SCALE
}

/// Picks an index in `0..count` from the scene hash of a cell.
///
/// The scaled value can round up to `count`; it is clamped to the last index.
pub fn scene_index(x: u32, y: u32, count: usize) -> usize {
    if count == 0 {
        return 0;
    }
    let idx = (unit(scene_hash(x, y)) * count as f64) as usize;
    idx.min(count - 1)
}
