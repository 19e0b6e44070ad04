//! Small synthetic worlds for unit tests.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::Rng;

use crate::geometry::GfxObjRecord;
use crate::region::{ObjectDesc, Region, Scene, SceneInfo, TerrainTypeInfo};
use crate::tile::{Frame, TerrainWord, Tile, TileId, TileInfo, VERTEX_DIM};
use crate::world::WorldDataset;

/// 1x1x2 post centered on its base.
pub const TREE_MODEL: u32 = 0x0100_0001;
/// 40x40x10 block centered on its base.
pub const HOUSE_MODEL: u32 = 0x0100_0002;
/// Type byte 0x03 resolves to a mesh with no parts.
pub const EMPTY_MODEL: u32 = 0x0300_0001;

pub const SCENE_SINGLE: u32 = 0x1200_0001;
pub const SCENE_CROWD: u32 = 0x1200_0002;
pub const SCENE_EMPTY_MODEL: u32 = 0x1200_0003;
pub const SCENE_DYNAMIC: u32 = 0x1200_0004;
pub const SCENE_VARIED: u32 = 0x1200_0005;
pub const SCENE_MISSING: u32 = 0x1200_00FF;

// Scene type selectors of terrain type 0
pub const SCENE_TYPE_NONE: u32 = 0;
pub const SCENE_TYPE_SINGLE: u32 = 1;
pub const SCENE_TYPE_CROWD: u32 = 2;
pub const SCENE_TYPE_MISSING: u32 = 3;
pub const SCENE_TYPE_EMPTY_MODEL: u32 = 4;
pub const SCENE_TYPE_DYNAMIC: u32 = 5;
pub const SCENE_TYPE_VARIED: u32 = 6;

/// Height table of `index * 2.0`, one terrain type with the scene types above.
pub fn region() -> Region {
    Region {
        height_table: (0..=255).map(|i| i as f32 * 2.0).collect(),
        terrain_types: vec![TerrainTypeInfo {
            name: "Grassland".into(),
            scene_types: (0..=6).collect(),
        }],
        scene_infos: vec![
            SceneInfo { scenes: vec![] },
            SceneInfo {
                scenes: vec![SCENE_SINGLE],
            },
            SceneInfo {
                scenes: vec![SCENE_CROWD],
            },
            SceneInfo {
                scenes: vec![SCENE_MISSING],
            },
            SceneInfo {
                scenes: vec![SCENE_EMPTY_MODEL],
            },
            SceneInfo {
                scenes: vec![SCENE_DYNAMIC],
            },
            SceneInfo {
                scenes: vec![SCENE_VARIED, SCENE_SINGLE],
            },
        ],
    }
}

/// Always placed, fixed scale 2 and no yaw, half a cell in from the corner.
pub fn fixed_object(model_id: u32) -> ObjectDesc {
    ObjectDesc {
        model_id,
        base_loc: Frame::at(Vec3::new(12.0, 12.0, 0.0)),
        freq: 1.0,
        displace_x: 0.0,
        displace_y: 0.0,
        min_scale: 2.0,
        max_scale: 2.0,
        max_rotation: 0.0,
        dynamic_object: 0,
    }
}

fn box_model(id: u32, half: f32, height: f32) -> GfxObjRecord {
    let mut vertices = Vec::new();
    for x in [-half, half] {
        for y in [-half, half] {
            for z in [0.0, height] {
                vertices.push([x, y, z]);
            }
        }
    }
    GfxObjRecord {
        id,
        vertices,
        polygons: vec![vec![0, 2, 6, 4], vec![1, 3, 7, 5]],
    }
}

/// Region, scenes and models, but no tiles.
pub fn test_world() -> WorldDataset {
    let mut world = WorldDataset::default();
    *world.region_mut() = region();

    world.insert_gfx_obj(box_model(TREE_MODEL, 0.5, 2.0));
    world.insert_gfx_obj(box_model(HOUSE_MODEL, 20.0, 10.0));

    world.insert_scene(Scene {
        id: SCENE_SINGLE,
        objects: vec![fixed_object(TREE_MODEL)],
    });
    world.insert_scene(Scene {
        id: SCENE_CROWD,
        objects: vec![fixed_object(TREE_MODEL); 10],
    });
    world.insert_scene(Scene {
        id: SCENE_EMPTY_MODEL,
        objects: vec![fixed_object(EMPTY_MODEL)],
    });
    world.insert_scene(Scene {
        id: SCENE_DYNAMIC,
        objects: vec![ObjectDesc {
            dynamic_object: 0x7000_0001,
            ..fixed_object(TREE_MODEL)
        }],
    });
    world.insert_scene(Scene {
        id: SCENE_VARIED,
        objects: vec![
            ObjectDesc {
                base_loc: Frame::at(Vec3::new(4.0, 20.0, 0.5)),
                freq: 0.6,
                displace_x: 18.0,
                displace_y: 30.0,
                min_scale: 0.5,
                max_scale: 1.5,
                max_rotation: 360.0,
                ..fixed_object(TREE_MODEL)
            },
            ObjectDesc {
                base_loc: Frame::at(Vec3::new(20.0, 2.0, 0.0)),
                freq: 0.3,
                displace_x: 6.0,
                max_rotation: 45.0,
                ..fixed_object(TREE_MODEL)
            },
        ],
    });

    world
}

/// Tiles plus an empty info record for each.
pub fn world_with_tiles(tiles: Vec<Tile>) -> WorldDataset {
    let mut world = test_world();
    for tile in tiles {
        world.insert_tile_info(TileInfo {
            id: tile.id.info_id(),
            ..default()
        });
        world.insert_tile(tile);
    }
    world
}

/// Every vertex at one height index, terrain type 0, no scenery.
pub fn flat_tile(id: TileId, height_index: u8) -> Tile {
    Tile {
        id,
        terrain: vec![0; VERTEX_DIM * VERTEX_DIM],
        height: vec![height_index; VERTEX_DIM * VERTEX_DIM],
    }
}

/// Flat tile whose every terrain word selects the same scene type.
pub fn scenic_tile(id: TileId, scene_type: u32, road: u16) -> Tile {
    Tile {
        terrain: vec![TerrainWord::pack(0, scene_type, road).0; VERTEX_DIM * VERTEX_DIM],
        ..flat_tile(id, 0)
    }
}

/// Random heights, roads and scene types drawn from the resolvable ones.
pub fn random_tile(rng: &mut StdRng, id: TileId) -> Tile {
    const SCENE_TYPES: [u32; 5] = [
        SCENE_TYPE_NONE,
        SCENE_TYPE_SINGLE,
        SCENE_TYPE_CROWD,
        SCENE_TYPE_VARIED,
        SCENE_TYPE_VARIED,
    ];
    let count = VERTEX_DIM * VERTEX_DIM;
    Tile {
        id,
        terrain: (0..count)
            .map(|_| {
                let scene_type = SCENE_TYPES[rng.gen_range(0..SCENE_TYPES.len())];
                let road = if rng.gen_bool(0.15) { rng.gen_range(1..4) } else { 0 };
                TerrainWord::pack(0, scene_type, road).0
            })
            .collect(),
        height: (0..count).map(|_| rng.gen_range(0..64)).collect(),
    }
}
