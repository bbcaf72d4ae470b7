//! Geometry and collision queries on the XZ plane
//!
//! Player, enemy and projectile motion all validate against the same few
//! predicates: field bounds, obstacle overlap, enemy overlap and segment sweeps.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::state::Enemy;
use crate::consts::{LOS_EPSILON, SEGMENT_EPSILON};

/// Axis-aligned footprint in XZ
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Aabb {
    pub min_x: f32,
    pub max_x: f32,
    pub min_z: f32,
    pub max_z: f32,
}

impl Aabb {
    /// Footprint grown by `amount` on every side
    #[inline]
    pub fn expanded(&self, amount: f32) -> Self {
        Self {
            min_x: self.min_x - amount,
            max_x: self.max_x + amount,
            min_z: self.min_z - amount,
            max_z: self.max_z + amount,
        }
    }

    /// Inclusive point containment
    #[inline]
    pub fn contains(&self, p: Vec3) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.z >= self.min_z && p.z <= self.max_z
    }
}

/// A static box obstacle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    /// Center on the ground plane
    pub center: Vec3,
    /// Extent along X
    pub width: f32,
    /// Extent along Z
    pub depth: f32,
    /// Visual height (collision is footprint-only)
    pub height: f32,
    pub aabb: Aabb,
}

impl Obstacle {
    pub fn new(x: f32, z: f32, width: f32, depth: f32, height: f32) -> Self {
        let mut obstacle = Self {
            center: Vec3::new(x, 0.0, z),
            width,
            depth,
            height,
            aabb: Aabb::default(),
        };
        obstacle.compute_aabb();
        obstacle
    }

    /// Derive the footprint from center and dimensions
    pub fn compute_aabb(&mut self) {
        let half_w = self.width / 2.0;
        let half_d = self.depth / 2.0;
        self.aabb = Aabb {
            min_x: self.center.x - half_w,
            max_x: self.center.x + half_w,
            min_z: self.center.z - half_d,
            max_z: self.center.z + half_d,
        };
    }
}

/// Rectangular region entities must stay inside
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldBounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_z: f32,
    pub max_z: f32,
}

impl FieldBounds {
    /// Square field of the given size with an inner margin
    pub fn square(size: f32, margin: f32) -> Self {
        let half = size / 2.0;
        Self {
            min_x: -half + margin,
            max_x: half - margin,
            min_z: -half + margin,
            max_z: half - margin,
        }
    }
}

/// Slab-method test of segment `p0 -> p1` against a footprint grown by `expand`
///
/// Near-zero segment components fall back to a range check on that axis.
pub fn segment_intersects_box(p0: Vec3, p1: Vec3, aabb: &Aabb, expand: f32) -> bool {
    let b = aabb.expanded(expand);
    let mut t_min = 0.0_f32;
    let mut t_max = 1.0_f32;

    for (start, delta, lo, hi) in [
        (p0.x, p1.x - p0.x, b.min_x, b.max_x),
        (p0.z, p1.z - p0.z, b.min_z, b.max_z),
    ] {
        if delta.abs() < SEGMENT_EPSILON {
            if start < lo || start > hi {
                return false;
            }
            continue;
        }
        let t1 = (lo - start) / delta;
        let t2 = (hi - start) / delta;
        t_min = t_min.max(t1.min(t2));
        t_max = t_max.min(t1.max(t2));
        if t_max < t_min {
            return false;
        }
    }

    t_max >= 0.0 && t_min <= 1.0
}

/// Whether any alive enemy's circle overlaps the query circle
pub fn collides_with_enemies(enemies: &[Enemy], position: Vec3, radius: f32) -> bool {
    enemies.iter().any(|e| {
        if !e.alive {
            return false;
        }
        let min_dist = radius + e.radius;
        let dx = position.x - e.position.x;
        let dz = position.z - e.position.z;
        dx * dx + dz * dz < min_dist * min_dist
    })
}

/// Obstacle registry plus field bounds
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollisionWorld {
    obstacles: Vec<Obstacle>,
    bounds: Option<FieldBounds>,
}

impl CollisionWorld {
    pub fn new(bounds: Option<FieldBounds>) -> Self {
        Self {
            obstacles: Vec::new(),
            bounds,
        }
    }

    pub fn add_obstacle(&mut self, obstacle: Obstacle) {
        self.obstacles.push(obstacle);
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn bounds(&self) -> Option<&FieldBounds> {
        self.bounds.as_ref()
    }

    /// Re-derive every obstacle footprint
    pub fn compute_aabbs(&mut self) {
        for obstacle in &mut self.obstacles {
            obstacle.compute_aabb();
        }
    }

    /// True when no obstacle (grown by a small epsilon) blocks `a -> b`
    pub fn has_line_of_sight(&self, a: Vec3, b: Vec3) -> bool {
        !self
            .obstacles
            .iter()
            .any(|ob| segment_intersects_box(a, b, &ob.aabb, LOS_EPSILON))
    }

    /// Whether a sweep of the given radius along `p0 -> p1` touches an obstacle
    pub fn path_hits_obstacle(&self, p0: Vec3, p1: Vec3, radius: f32) -> bool {
        self.obstacles
            .iter()
            .any(|ob| segment_intersects_box(p0, p1, &ob.aabb, radius))
    }

    /// Whether a circle overlaps any obstacle footprint
    pub fn check_obstacle_collision(&self, position: Vec3, radius: f32) -> bool {
        self.obstacles
            .iter()
            .any(|ob| ob.aabb.expanded(radius).contains(position))
    }

    /// Whether a circle fits inside the field. Always true without bounds.
    pub fn is_within_field_bounds(&self, position: Vec3, radius: f32) -> bool {
        let Some(b) = self.bounds else {
            return true;
        };
        position.x >= b.min_x + radius
            && position.x <= b.max_x - radius
            && position.z >= b.min_z + radius
            && position.z <= b.max_z - radius
    }

    /// Bounds plus obstacles (the static half of "can I stand here")
    #[inline]
    pub fn is_free(&self, position: Vec3, radius: f32) -> bool {
        self.is_within_field_bounds(position, radius)
            && !self.check_obstacle_collision(position, radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{EnemyId, EnemyKind};
    use proptest::prelude::*;

    fn unit_box() -> Aabb {
        Obstacle::new(0.0, 0.0, 2.0, 2.0, 1.0).aabb
    }

    #[test]
    fn test_segment_through_box() {
        let b = unit_box();
        assert!(segment_intersects_box(
            Vec3::new(-5.0, 0.0, 0.0),
            Vec3::new(5.0, 0.0, 0.0),
            &b,
            0.0
        ));
    }

    #[test]
    fn test_segment_stops_short() {
        let b = unit_box();
        assert!(!segment_intersects_box(
            Vec3::new(-5.0, 0.0, 0.0),
            Vec3::new(-2.0, 0.0, 0.0),
            &b,
            0.0
        ));
        // Expansion reaches it
        assert!(segment_intersects_box(
            Vec3::new(-5.0, 0.0, 0.0),
            Vec3::new(-2.0, 0.0, 0.0),
            &b,
            1.5
        ));
    }

    #[test]
    fn test_degenerate_segment_is_point_check() {
        let b = unit_box();
        let inside = Vec3::new(0.5, 0.0, 0.5);
        let outside = Vec3::new(3.0, 0.0, 0.5);
        assert!(segment_intersects_box(inside, inside, &b, 0.0));
        assert!(!segment_intersects_box(outside, outside, &b, 0.0));
    }

    #[test]
    fn test_line_of_sight_blocked_by_wall() {
        let mut world = CollisionWorld::new(None);
        world.add_obstacle(Obstacle::new(0.0, 5.0, 10.0, 1.0, 2.0));
        assert!(!world.has_line_of_sight(Vec3::ZERO, Vec3::new(0.0, 0.0, 10.0)));
        assert!(world.has_line_of_sight(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0)));
    }

    #[test]
    fn test_obstacle_collision_uses_radius() {
        let mut world = CollisionWorld::new(None);
        world.add_obstacle(Obstacle::new(0.0, 0.0, 2.0, 2.0, 1.0));
        assert!(!world.check_obstacle_collision(Vec3::new(2.0, 0.0, 0.0), 0.5));
        assert!(world.check_obstacle_collision(Vec3::new(2.0, 0.0, 0.0), 1.0));
    }

    #[test]
    fn test_field_bounds() {
        let world = CollisionWorld::new(Some(FieldBounds::square(20.0, 2.0)));
        assert!(world.is_within_field_bounds(Vec3::new(7.0, 0.0, 0.0), 1.0));
        assert!(!world.is_within_field_bounds(Vec3::new(7.5, 0.0, 0.0), 1.0));
        assert!(CollisionWorld::new(None).is_within_field_bounds(Vec3::splat(1e6), 5.0));
    }

    #[test]
    fn test_collides_with_alive_enemies_only() {
        let mut enemy = Enemy::new(EnemyId(1), EnemyKind::Normal, Vec3::ZERO, 3, 2.8, 20);
        let probe = Vec3::new(1.0, 0.0, 0.0);
        assert!(collides_with_enemies(std::slice::from_ref(&enemy), probe, 0.5));
        enemy.alive = false;
        assert!(!collides_with_enemies(std::slice::from_ref(&enemy), probe, 0.5));
    }

    proptest! {
        #[test]
        fn prop_aabb_ordered(
            x in -100.0f32..100.0, z in -100.0f32..100.0,
            w in 0.01f32..50.0, d in 0.01f32..50.0,
        ) {
            let ob = Obstacle::new(x, z, w, d, 1.0);
            prop_assert!(ob.aabb.min_x < ob.aabb.max_x);
            prop_assert!(ob.aabb.min_z < ob.aabb.max_z);
        }

        #[test]
        fn prop_segment_left_of_box_misses(
            w in 0.5f32..10.0, d in 0.5f32..10.0, expand in 0.0f32..1.0,
            gap0 in 0.01f32..20.0, gap1 in 0.01f32..20.0,
            z0 in -30.0f32..30.0, z1 in -30.0f32..30.0,
        ) {
            let b = Obstacle::new(0.0, 0.0, w, d, 1.0).aabb;
            let edge = b.min_x - expand;
            let p0 = Vec3::new(edge - gap0, 0.0, z0);
            let p1 = Vec3::new(edge - gap1, 0.0, z1);
            prop_assert!(!segment_intersects_box(p0, p1, &b, expand));
        }

        #[test]
        fn prop_segment_inside_box_hits(
            w in 0.5f32..10.0, d in 0.5f32..10.0,
            u0 in 0.05f32..0.95, v0 in 0.05f32..0.95,
            u1 in 0.05f32..0.95, v1 in 0.05f32..0.95,
        ) {
            let b = Obstacle::new(0.0, 0.0, w, d, 1.0).aabb;
            let lerp = |u: f32, v: f32| Vec3::new(
                b.min_x + (b.max_x - b.min_x) * u,
                0.0,
                b.min_z + (b.max_z - b.min_z) * v,
            );
            prop_assert!(segment_intersects_box(lerp(u0, v0), lerp(u1, v1), &b, 0.0));
        }

        #[test]
        fn prop_line_of_sight_symmetric(
            ax in -40.0f32..40.0, az in -40.0f32..40.0,
            bx in -40.0f32..40.0, bz in -40.0f32..40.0,
        ) {
            let world = crate::sim::arena::standard_arena();
            let a = Vec3::new(ax, 1.0, az);
            let b = Vec3::new(bx, 1.0, bz);
            prop_assert_eq!(world.has_line_of_sight(a, b), world.has_line_of_sight(b, a));
        }
    }
}
