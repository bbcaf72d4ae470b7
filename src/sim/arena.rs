//! Standard arena layout
//!
//! A square field ringed by boundary walls, with a diagonal run of small
//! "candle" boxes and a handful of long wall segments. All of them register
//! as obstacles so they block movement, shots and line of sight.

use super::collision::{CollisionWorld, FieldBounds, Obstacle};

/// Ground plane edge length
pub const FIELD_SIZE: f32 = 180.0;
/// Gap between the boundary walls and the walkable region
pub const FIELD_MARGIN: f32 = 2.0;

const WALL_THICKNESS: f32 = 1.5;
const WALL_HEIGHT: f32 = 4.0;

const CANDLE_COUNT: usize = 16;
const CANDLE_X_START: f32 = -58.0;
const CANDLE_X_END: f32 = 58.0;
const CANDLE_Z_START: f32 = -36.0;
const CANDLE_Z_STEP: f32 = 4.2;
const CANDLE_DEPTH: f32 = 0.9;
const CANDLE_HEIGHT: f32 = 2.2;

const LONG_WALL_HEIGHT: f32 = 2.0;
/// (x, z, width, depth)
const LONG_WALLS: [(f32, f32, f32, f32); 7] = [
    (-30.0, 44.0, 28.0, 1.1),
    (18.0, 12.0, 26.0, 1.1),
    (-14.0, -10.0, 22.0, 1.1),
    (36.0, -34.0, 30.0, 1.1),
    (-22.0, 28.0, 1.1, 12.0),
    (54.0, 20.0, 1.1, 14.0),
    (-46.0, -26.0, 1.1, 12.0),
];

/// Build the standard arena
pub fn standard_arena() -> CollisionWorld {
    let mut world = CollisionWorld::new(Some(FieldBounds::square(FIELD_SIZE, FIELD_MARGIN)));
    add_boundary_walls(&mut world, FIELD_SIZE);
    add_candles_and_walls(&mut world, FIELD_SIZE);
    world.compute_aabbs();

    log::debug!("Arena built with {} obstacles", world.obstacles().len());
    world
}

/// An open field with bounds only
pub fn open_field(size: f32) -> CollisionWorld {
    CollisionWorld::new(Some(FieldBounds::square(size, FIELD_MARGIN)))
}

fn add_boundary_walls(world: &mut CollisionWorld, size: f32) {
    let half = size / 2.0;
    let full = size + WALL_THICKNESS * 2.0;
    let offset = half + WALL_THICKNESS / 2.0;

    world.add_obstacle(Obstacle::new(0.0, offset, full, WALL_THICKNESS, WALL_HEIGHT));
    world.add_obstacle(Obstacle::new(0.0, -offset, full, WALL_THICKNESS, WALL_HEIGHT));
    world.add_obstacle(Obstacle::new(offset, 0.0, WALL_THICKNESS, size, WALL_HEIGHT));
    world.add_obstacle(Obstacle::new(-offset, 0.0, WALL_THICKNESS, size, WALL_HEIGHT));
}

fn add_candles_and_walls(world: &mut CollisionWorld, size: f32) {
    let half = size / 2.0 - 4.0;
    let inside = |x: f32, z: f32| x > -half && x < half && z > -half && z < half;

    let dx = (CANDLE_X_END - CANDLE_X_START) / (CANDLE_COUNT - 1) as f32;
    for i in 0..CANDLE_COUNT {
        let fi = i as f32;
        let x = CANDLE_X_START + fi * dx;
        let z = CANDLE_Z_START + fi * CANDLE_Z_STEP + (fi * 0.7).sin() * 1.2;
        let w = (0.9 + ((fi * 0.33).sin() + 1.0) * 0.3).clamp(0.9, 1.6);
        if inside(x, z) {
            world.add_obstacle(Obstacle::new(x, z, w, CANDLE_DEPTH, CANDLE_HEIGHT));
        }
    }

    for (x, z, w, d) in LONG_WALLS {
        if inside(x, z) {
            world.add_obstacle(Obstacle::new(x, z, w, d, LONG_WALL_HEIGHT));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_standard_arena_obstacle_count() {
        let world = standard_arena();
        // 4 boundary walls + 16 candles + 7 long walls
        assert_eq!(world.obstacles().len(), 4 + CANDLE_COUNT + LONG_WALLS.len());
    }

    #[test]
    fn test_spawn_point_is_clear() {
        let world = standard_arena();
        assert!(world.is_free(Vec3::new(0.0, 1.0, 0.0), 0.9));
    }

    #[test]
    fn test_boundary_walls_block_escape() {
        let world = standard_arena();
        let inside = Vec3::new(0.0, 1.0, 80.0);
        let outside = Vec3::new(0.0, 1.0, 100.0);
        assert!(world.path_hits_obstacle(inside, outside, 0.05));
        assert!(!world.is_within_field_bounds(Vec3::new(0.0, 1.0, 88.5), 0.9));
    }
}
