//! Deterministic scenery placement.
//!
//! Every decision (which scene, which objects, where, how big, which way)
//! comes from the integer hashes in [`crate::hash`] of the global cell
//! coordinates, so any two machines given the same world data produce the
//! same placements. Nothing here keeps state between tiles.

use bevy::prelude::*;

use crate::config::{CollisionPolicy, SceneryConfig};
use crate::error::Result;
use crate::geometry::GeometrySource;
use crate::hash::{object_hash, offset, quadrant_hash, scene_index, unit};
use crate::mesh::GroundHeight;
use crate::model::ModelInstance;
use crate::region::ObjectDesc;
use crate::tile::{TerrainWord, Tile, CELL_SIZE, TILE_SIZE, VERTEX_DIM};
use crate::world::WorldData;

/// Places scenery objects on tiles.
pub struct SceneryPlacer<'a> {
    world: &'a dyn WorldData,
    geometry: &'a dyn GeometrySource,
    config: &'a SceneryConfig,
}

impl<'a> SceneryPlacer<'a> {
    pub fn new(
        world: &'a dyn WorldData,
        geometry: &'a dyn GeometrySource,
        config: &'a SceneryConfig,
    ) -> Self {
        Self {
            world,
            geometry,
            config,
        }
    }

    /// Generates the scenery of one tile.
    ///
    /// Cells are visited in terrain-array order (`i = x * 9 + y`, all 81
    /// vertex slots). `ground` answers heights in tile-local coordinates.
    /// `buildings` are only consulted when the collision policy asks for it.
    pub fn place(
        &self,
        tile: &Tile,
        ground: &dyn GroundHeight,
        buildings: &[ModelInstance],
    ) -> Result<Vec<ModelInstance>> {
        tile.validate()?;
        let mut placed = Vec::new();
        if self.config.max_objects == 0 {
            return Ok(placed);
        }

        let region = self.world.region();
        let origin = tile.id.cell_origin();
        let mut scenes_used = 0;

        for (i, &word) in tile.terrain.iter().enumerate() {
            let word = TerrainWord(word);
            let scenes = region.scene_candidates(word.terrain_type(), word.scene_type())?;
            if scenes.is_empty() {
                continue;
            }

            let cell_x = (i / VERTEX_DIM) as u32;
            let cell_y = (i % VERTEX_DIM) as u32;
            let gx = origin.x.wrapping_add(cell_x);
            let gy = origin.y.wrapping_add(cell_y);

            let scene = self.world.scene(scenes[scene_index(gx, gy, scenes.len())])?;
            scenes_used += 1;

            for (k, obj) in scene.objects.iter().enumerate() {
                let k = k as u32;
                if obj.is_dynamic() || unit(object_hash(gx, gy, k, offset::FREQUENCY)) >= obj.freq as f64 {
                    continue;
                }

                let shift = displace(obj, gx, gy, k);
                let local = Vec2::new(
                    cell_x as f32 * CELL_SIZE + shift.x,
                    cell_y as f32 * CELL_SIZE + shift.y,
                );
                if !within_tile(local) || tile.on_road(local) {
                    continue;
                }

                let mesh = self.geometry.mesh(obj.model_id)?;
                if mesh.is_empty() && self.config.skip_empty_models {
                    continue;
                }

                let z = obj.base_loc.origin[2] + ground.height_at(local);
                let instance = ModelInstance::new(
                    mesh,
                    obj.base_loc,
                    local.extend(z),
                    object_heading(obj, gx, gy, k),
                    object_scale(obj, gx, gy, k),
                    UVec2::new(gx, gy),
                );

                if self.collides(&instance, buildings, &placed) {
                    continue;
                }
                placed.push(instance);

                if placed.len() >= self.config.max_objects {
                    debug!(
                        "Tile {}: scenery cap of {} reached at cell ({}, {})",
                        tile.id, self.config.max_objects, cell_x, cell_y
                    );
                    return Ok(placed);
                }
            }
        }

        debug!(
            "Tile {}: {} scenery objects from {} scenes",
            tile.id,
            placed.len(),
            scenes_used
        );
        Ok(placed)
    }

    fn collides(&self, instance: &ModelInstance, buildings: &[ModelInstance], placed: &[ModelInstance]) -> bool {
        let hits = |others: &[ModelInstance]| {
            others
                .iter()
                .any(|other| instance.bounding_box.intersects(&other.bounding_box))
        };
        match self.config.collision {
            CollisionPolicy::Disabled => false,
            CollisionPolicy::Buildings => hits(buildings),
            CollisionPolicy::BuildingsAndScenery => hits(buildings) || hits(placed),
        }
    }
}

/// Scenery for one tile with the given world, geometry and config.
pub fn place(
    world: &dyn WorldData,
    geometry: &dyn GeometrySource,
    config: &SceneryConfig,
    tile: &Tile,
    ground: &dyn GroundHeight,
) -> Result<Vec<ModelInstance>> {
    SceneryPlacer::new(world, geometry, config).place(tile, ground, &[])
}

/// Inclusive `[0, 192]` on both axes. Out-of-range placements are dropped,
/// never clamped.
fn within_tile(point: Vec2) -> bool {
    point.x >= 0.0 && point.y >= 0.0 && point.x <= TILE_SIZE && point.y <= TILE_SIZE
}

/// Offset of object `k` from its cell origin.
///
/// Each axis is displaced independently (an axis with no displacement keeps
/// the base coordinate), then the result is turned by a multiple of 90
/// degrees chosen per cell.
pub fn displace(obj: &ObjectDesc, x: u32, y: u32, k: u32) -> Vec2 {
    let base = obj.base_loc.origin;

    let dx = if obj.displace_x <= 0.0 {
        base[0]
    } else {
        (unit(object_hash(x, y, k, offset::DISPLACE_X)) * obj.displace_x as f64 + base[0] as f64) as f32
    };
    let dy = if obj.displace_y <= 0.0 {
        base[1]
    } else {
        (unit(object_hash(x, y, k, offset::DISPLACE_Y)) * obj.displace_y as f64 + base[1] as f64) as f32
    };

    let quadrant = unit(quadrant_hash(x, y));
    if quadrant >= 0.75 {
        Vec2::new(dy, -dx)
    } else if quadrant >= 0.5 {
        Vec2::new(-dx, -dy)
    } else if quadrant >= 0.25 {
        Vec2::new(-dy, dx)
    } else {
        Vec2::new(dx, dy)
    }
}

/// Log-uniform scale between the descriptor's bounds.
pub fn object_scale(obj: &ObjectDesc, x: u32, y: u32, k: u32) -> f32 {
    if obj.min_scale == obj.max_scale {
        return obj.max_scale;
    }
    let ratio = (obj.max_scale / obj.min_scale) as f64;
    (ratio.powf(unit(object_hash(x, y, k, offset::SCALE))) * obj.min_scale as f64) as f32
}

/// Yaw in degrees, `[0, max_rotation)`.
pub fn object_heading(obj: &ObjectDesc, x: u32, y: u32, k: u32) -> f32 {
    if obj.max_rotation <= 0.0 {
        return 0.0;
    }
    (unit(object_hash(x, y, k, offset::ROTATION)) * obj.max_rotation as f64) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LandscapeError;
    use crate::geometry::StaticMeshCache;
    use crate::height_field::tile_vertex_heights;
    use crate::mesh::Mesh;
    use crate::model::local_cell;
    use crate::test_support::*;
    use crate::tile::{Frame, TileId};
    use crate::world::WorldDataset;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn run(world: &WorldDataset, tile: &Tile, config: &SceneryConfig) -> Result<Vec<ModelInstance>> {
        let cache = StaticMeshCache::new(world);
        let ground = Mesh::build(&tile_vertex_heights(tile, world.region()).unwrap());
        place(world, &cache, config, tile, &ground)
    }

    fn assert_within_tile(placed: &[ModelInstance]) {
        for p in placed {
            assert!(
                (0.0..=TILE_SIZE).contains(&p.position.x) && (0.0..=TILE_SIZE).contains(&p.position.y),
                "placement outside the tile: {:?}",
                p.position
            );
        }
    }

    #[test]
    fn test_empty_scene_lists_place_nothing() {
        let world = test_world();
        let tile = flat_tile(TileId::from_xy(0x7D, 0x64), 0);
        let placed = run(&world, &tile, &SceneryConfig::default()).unwrap();
        assert!(placed.is_empty());
    }

    #[test]
    fn test_fixed_scale_and_zero_rotation() {
        let world = test_world();
        let tile = scenic_tile(TileId::from_xy(0x7D, 0x64), SCENE_TYPE_SINGLE, 0);
        let placed = run(&world, &tile, &SceneryConfig::default()).unwrap();

        // Cells 1..=7 on both axes always stay inside the tile
        assert!(placed.len() >= 49);
        assert!(placed.len() <= 81);
        for p in &placed {
            assert_eq!(p.model_id, TREE_MODEL);
            assert_eq!(p.scale, 2.0);
            assert_eq!(p.heading_degrees, 0.0);
            assert_eq!(p.rotation, Quat::IDENTITY);
        }
        assert_within_tile(&placed);
    }

    #[test]
    fn test_placement_offsets_are_quarter_turns_of_base() {
        let world = test_world();
        let id = TileId::from_xy(3, 9);
        let tile = scenic_tile(id, SCENE_TYPE_SINGLE, 0);
        let placed = run(&world, &tile, &SceneryConfig::default()).unwrap();

        for p in &placed {
            let local = p.cell - id.cell_origin();
            let offset = p.position.truncate() - local.as_vec2() * CELL_SIZE;
            assert_eq!(offset.abs(), Vec2::splat(12.0));
        }
    }

    #[test]
    fn test_cap_stops_placement() {
        let world = test_world();
        let tile = scenic_tile(TileId::from_xy(20, 30), SCENE_TYPE_CROWD, 0);

        let placed = run(&world, &tile, &SceneryConfig::default()).unwrap();
        assert_eq!(placed.len(), 300);

        let config = SceneryConfig {
            max_objects: 25,
            ..default()
        };
        let capped = run(&world, &tile, &config).unwrap();
        assert_eq!(capped.len(), 25);
        assert_eq!(&placed[..25], &capped[..]);

        let none = SceneryConfig {
            max_objects: 0,
            ..default()
        };
        assert!(run(&world, &tile, &none).unwrap().is_empty());
    }

    #[test]
    fn test_dynamic_objects_are_never_placed() {
        let world = test_world();
        let tile = scenic_tile(TileId::from_xy(1, 1), SCENE_TYPE_DYNAMIC, 0);
        assert!(run(&world, &tile, &SceneryConfig::default()).unwrap().is_empty());
    }

    #[test]
    fn test_roads_reject_placements() {
        let world = test_world();
        let tile = scenic_tile(TileId::from_xy(1, 1), SCENE_TYPE_SINGLE, 1);
        assert!(run(&world, &tile, &SceneryConfig::default()).unwrap().is_empty());
    }

    #[test]
    fn test_empty_models_follow_config() {
        let world = test_world();
        let tile = scenic_tile(TileId::from_xy(5, 5), SCENE_TYPE_EMPTY_MODEL, 0);
        assert!(run(&world, &tile, &SceneryConfig::default()).unwrap().is_empty());

        let keep = SceneryConfig {
            skip_empty_models: false,
            ..default()
        };
        let placed = run(&world, &tile, &keep).unwrap();
        assert!(!placed.is_empty());
        assert!(placed.iter().all(|p| p.mesh.is_empty() && p.bounding_box.is_empty()));
    }

    #[test]
    fn test_missing_scene_fails_the_tile() {
        let world = test_world();
        let tile = scenic_tile(TileId::from_xy(1, 1), SCENE_TYPE_MISSING, 0);
        let err = run(&world, &tile, &SceneryConfig::default()).unwrap_err();
        assert!(matches!(err, LandscapeError::MissingScene(SCENE_MISSING)));
        assert!(err.is_missing_record());
    }

    #[test]
    fn test_objects_rest_on_the_ground() {
        let world = test_world();
        let tile = Tile {
            height: vec![5; 81],
            ..scenic_tile(TileId::from_xy(2, 2), SCENE_TYPE_SINGLE, 0)
        };
        let placed = run(&world, &tile, &SceneryConfig::default()).unwrap();
        assert!(!placed.is_empty());
        for p in &placed {
            assert_eq!(p.position.z, 10.0);
        }
    }

    #[test]
    fn test_collision_policy() {
        let world = test_world();
        let id = TileId::from_xy(20, 30);
        let tile = scenic_tile(id, SCENE_TYPE_CROWD, 0);

        let config = SceneryConfig {
            collision: CollisionPolicy::BuildingsAndScenery,
            ..default()
        };
        let placed = run(&world, &tile, &config).unwrap();
        // Stacked copies collide; at most one survives per cell
        assert!(!placed.is_empty());
        assert!(placed.len() <= 81);
        for (i, a) in placed.iter().enumerate() {
            for b in &placed[i + 1..] {
                assert!(!a.bounding_box.intersects(&b.bounding_box));
            }
        }

        // A building over the whole tile blocks everything
        let cache = StaticMeshCache::new(&world);
        let ground = Mesh::build(&tile_vertex_heights(&tile, world.region()).unwrap());
        let house = ModelInstance::new(
            cache.mesh(HOUSE_MODEL).unwrap(),
            Frame::default(),
            Vec3::new(96.0, 96.0, 0.0),
            0.0,
            5.0,
            id.cell_origin() + local_cell(Vec2::splat(96.0)),
        );
        let buildings_only = SceneryConfig {
            collision: CollisionPolicy::Buildings,
            ..default()
        };
        let placer = SceneryPlacer::new(&world, &cache, &buildings_only);
        assert!(placer.place(&tile, &ground, &[house.clone()]).unwrap().is_empty());

        // With collisions disabled the building is ignored
        let disabled = SceneryConfig::default();
        let placer = SceneryPlacer::new(&world, &cache, &disabled);
        assert_eq!(placer.place(&tile, &ground, &[house]).unwrap().len(), 300);
    }

    #[test]
    fn test_random_tiles_are_deterministic_and_in_bounds() {
        let world = test_world();
        let mut rng = StdRng::seed_from_u64(0x5CE7E);

        for _ in 0..64 {
            let id = TileId::from_xy(rng.gen_range(0..=255), rng.gen_range(0..=255));
            let tile = random_tile(&mut rng, id);

            let first = run(&world, &tile, &SceneryConfig::default()).unwrap();
            let second = run(&world, &tile, &SceneryConfig::default()).unwrap();
            assert_eq!(first, second);
            assert!(first.len() <= 300);
            assert_within_tile(&first);
            for p in &first {
                assert!(!tile.on_road(p.position.truncate()));
                assert!(p.scale == 2.0 || (0.5..=1.5).contains(&p.scale));
                assert!((0.0..=360.0).contains(&p.heading_degrees));
            }
        }
    }

    #[test]
    fn test_object_scale_and_heading() {
        let obj = ObjectDesc {
            min_scale: 0.5,
            max_scale: 2.0,
            max_rotation: 90.0,
            ..fixed_object(TREE_MODEL)
        };
        for k in 0..16 {
            let scale = object_scale(&obj, 1003, 805, k);
            assert!((0.5..=2.0).contains(&scale));
            let heading = object_heading(&obj, 1003, 805, k);
            assert!((0.0..=90.0).contains(&heading));
        }
        let flat = fixed_object(TREE_MODEL);
        assert_eq!(object_scale(&flat, 1, 1, 0), 2.0);
        assert_eq!(object_heading(&flat, 1, 1, 0), 0.0);
    }

    #[test]
    fn test_varied_object_known_values() {
        let obj = ObjectDesc {
            base_loc: Frame::at(Vec3::new(4.0, 20.0, 0.0)),
            displace_x: 18.0,
            displace_y: 30.0,
            min_scale: 0.5,
            max_scale: 1.5,
            max_rotation: 360.0,
            ..fixed_object(TREE_MODEL)
        };
        // Quadrant 3: (dx, dy) comes back as (dy, -dx)
        assert_eq!(displace(&obj, 1003, 805, 0), Vec2::new(26.899967, -13.237191));
        assert_eq!(object_scale(&obj, 1003, 805, 0), 0.86847806);
        assert_eq!(object_heading(&obj, 1003, 805, 0), 295.14758);
    }

    #[test]
    fn test_varied_tile_known_placements() {
        let world = test_world();
        let mut tile = flat_tile(TileId::from_xy(125, 100), 0);
        for (x, y, scene_type) in [
            (2, 5, SCENE_TYPE_VARIED),
            (3, 5, SCENE_TYPE_VARIED),
            (4, 6, SCENE_TYPE_VARIED),
            (6, 4, SCENE_TYPE_VARIED),
        ] {
            tile.terrain[x * VERTEX_DIM + y] = TerrainWord::pack(0, scene_type, 0).0;
        }

        let placed = run(&world, &tile, &SceneryConfig::default()).unwrap();
        let summary: Vec<_> = placed
            .iter()
            .map(|p| (p.cell, p.position, p.scale, p.heading_degrees))
            .collect();
        assert_eq!(
            summary,
            vec![
                (UVec2::new(1002, 805), Vec3::new(36.630627, 78.56594, 0.5), 0.5872557, 56.432144),
                (UVec2::new(1002, 805), Vec3::new(27.624304, 118.0, 0.0), 2.0, 36.448315),
                // Picks the second candidate, the single fixed tree
                (UVec2::new(1003, 805), Vec3::new(84.0, 108.0, 0.0), 2.0, 0.0),
                // Cell (4, 6) fails both frequency rolls
                (UVec2::new(1006, 804), Vec3::new(154.92253, 124.303314, 0.5), 0.67020565, 95.953575),
            ]
        );
    }

    #[test]
    fn test_displace_without_displacement_keeps_base_magnitude() {
        let obj = fixed_object(TREE_MODEL);
        for (x, y) in [(0, 0), (8, 8), (1003, 805), (2047, 1)] {
            let d = displace(&obj, x, y, 0);
            assert_eq!(d.abs(), Vec2::splat(12.0));
        }
    }
}
