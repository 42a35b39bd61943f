//! Physics - Geometric probes the runner uses to sense the track
//!
//! The controller only talks to `PhysicsQuery`. `TrackWorld` is the
//! built-in implementation: axis-aligned boxes derived from the current
//! tiles and obstacles, which is all a grid-aligned track needs.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::game_server::tile::{Obstacle, ObstacleId, Tile, TileId, TileKind};

/// Height of the turn trigger volume above the walking surface
const TURN_TRIGGER_REACH: f32 = 3.0;

/// Collision layer a probe is filtered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    Ground,
    Turn,
    Obstacle,
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        let half = size * 0.5;
        Self::new(center - half, center + half)
    }

    /// Overlap test; touching faces do not count.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.cmplt(other.max).all() && self.max.cmpgt(other.min).all()
    }

    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        let closest = center.clamp(self.min, self.max);
        closest.distance_squared(center) <= radius * radius
    }

    /// Slab test. Returns the distance along `dir` (unit length) to the
    /// first surface hit within `max_distance`.
    pub fn ray_distance(&self, origin: Vec3, dir: Vec3, max_distance: f32) -> Option<f32> {
        let mut t_min = 0.0_f32;
        let mut t_max = max_distance;

        for axis in 0..3 {
            let o = origin[axis];
            let d = dir[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);

            if d.abs() < f32::EPSILON {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / d;
            let mut t0 = (lo - o) * inv;
            let mut t1 = (hi - o) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }

        Some(t_min)
    }
}

/// What a collider belongs to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ColliderSource {
    Tile { id: TileId, kind: TileKind, pivot: Vec3 },
    Obstacle { id: ObstacleId },
}

/// A collision volume on one layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Collider {
    pub layer: Layer,
    pub bounds: Aabb,
    pub source: ColliderSource,
}

/// Result of a ray that hit something
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub distance: f32,
    pub point: Vec3,
    pub collider: Collider,
}

/// Probe interface the locomotion controller consumes
pub trait PhysicsQuery {
    /// Nearest hit along a ray, filtered by layer
    fn raycast(&self, origin: Vec3, dir: Vec3, max_distance: f32, layer: Layer) -> Option<RayHit>;

    /// Every collider on `layer` touching the sphere
    fn overlap_sphere(&self, center: Vec3, radius: f32, layer: Layer) -> Vec<Collider>;

    /// Every collider on `layer` overlapping the box
    fn overlap_box(&self, bounds: &Aabb, layer: Layer) -> Vec<Collider>;
}

/// Collision world built from the live track
#[derive(Debug, Clone, Default)]
pub struct TrackWorld {
    colliders: Vec<Collider>,
}

impl TrackWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the world from the current tiles and obstacles
    pub fn from_track<'a>(
        tiles: impl IntoIterator<Item = &'a Tile>,
        obstacles: impl IntoIterator<Item = &'a Obstacle>,
    ) -> Self {
        let mut world = Self::new();
        for tile in tiles {
            world.add_tile(tile);
        }
        for obstacle in obstacles {
            world.add_obstacle(obstacle);
        }
        world
    }

    pub fn add_tile(&mut self, tile: &Tile) {
        let source = ColliderSource::Tile {
            id: tile.id,
            kind: tile.kind,
            pivot: tile.pivot,
        };

        self.colliders.push(Collider {
            layer: Layer::Ground,
            bounds: tile.bounds(),
            source,
        });

        if tile.kind.is_turn() {
            self.colliders.push(Collider {
                layer: Layer::Turn,
                bounds: tile.turn_area(TURN_TRIGGER_REACH),
                source,
            });
        }
    }

    pub fn add_obstacle(&mut self, obstacle: &Obstacle) {
        self.colliders.push(Collider {
            layer: Layer::Obstacle,
            bounds: obstacle.bounds(),
            source: ColliderSource::Obstacle { id: obstacle.id },
        });
    }

    pub fn add_collider(&mut self, collider: Collider) {
        self.colliders.push(collider);
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    fn on_layer(&self, layer: Layer) -> impl Iterator<Item = &Collider> {
        self.colliders.iter().filter(move |c| c.layer == layer)
    }
}

impl PhysicsQuery for TrackWorld {
    fn raycast(&self, origin: Vec3, dir: Vec3, max_distance: f32, layer: Layer) -> Option<RayHit> {
        let dir = dir.normalize_or_zero();
        if dir == Vec3::ZERO {
            return None;
        }

        self.on_layer(layer)
            .filter_map(|collider| {
                collider
                    .bounds
                    .ray_distance(origin, dir, max_distance)
                    .map(|distance| RayHit {
                        distance,
                        point: origin + dir * distance,
                        collider: *collider,
                    })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    fn overlap_sphere(&self, center: Vec3, radius: f32, layer: Layer) -> Vec<Collider> {
        self.on_layer(layer)
            .filter(|c| c.bounds.intersects_sphere(center, radius))
            .copied()
            .collect()
    }

    fn overlap_box(&self, bounds: &Aabb, layer: Layer) -> Vec<Collider> {
        self.on_layer(layer)
            .filter(|c| c.bounds.intersects(bounds))
            .copied()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_server::heading::Heading;
    use crate::game_server::tile::TileCatalog;

    fn unit_box() -> Aabb {
        Aabb::new(Vec3::ZERO, Vec3::ONE)
    }

    #[test]
    fn aabb_overlap_excludes_touching() {
        let a = unit_box();
        let b = Aabb::new(Vec3::new(0.5, 0.5, 0.5), Vec3::splat(2.0));
        let c = Aabb::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn ray_hits_top_face() {
        let slab = Aabb::new(Vec3::new(-2.0, -0.5, -2.0), Vec3::new(2.0, 0.0, 2.0));
        let hit = slab.ray_distance(Vec3::new(0.0, 0.1, 0.0), Vec3::NEG_Y, 0.2);
        assert!((hit.unwrap() - 0.1).abs() < 1e-6);
        assert_eq!(slab.ray_distance(Vec3::new(0.0, 0.5, 0.0), Vec3::NEG_Y, 0.2), None);
        assert_eq!(slab.ray_distance(Vec3::new(3.0, 0.1, 0.0), Vec3::NEG_Y, 5.0), None);
    }

    #[test]
    fn sphere_overlap() {
        let b = unit_box();
        assert!(b.intersects_sphere(Vec3::new(1.05, 0.5, 0.5), 0.1));
        assert!(!b.intersects_sphere(Vec3::new(1.2, 0.5, 0.5), 0.1));
    }

    #[test]
    fn world_filters_by_layer() {
        let catalog = TileCatalog::default();
        let straight = Tile::from_prefab(0, &catalog.straight, Vec3::ZERO, Heading::North);
        let turn = Tile::from_prefab(1, &catalog.turn_tiles[0], Vec3::new(0.0, 0.0, 4.0), Heading::North);
        let world = TrackWorld::from_track([&straight, &turn], &[] as &[Obstacle]);

        // ground slab for both, turn trigger only for the turn tile
        assert_eq!(world.len(), 3);

        let at_straight = world.overlap_sphere(Vec3::new(0.0, 1.0, 0.0), 0.1, Layer::Turn);
        assert!(at_straight.is_empty());

        let at_turn = world.overlap_sphere(Vec3::new(0.0, 1.0, 4.0), 0.1, Layer::Turn);
        assert_eq!(at_turn.len(), 1);
        match at_turn[0].source {
            ColliderSource::Tile { id, kind, .. } => {
                assert_eq!(id, 1);
                assert_eq!(kind, TileKind::Left);
            }
            ColliderSource::Obstacle { .. } => panic!("expected a tile"),
        }
    }

    #[test]
    fn raycast_returns_nearest() {
        let mut world = TrackWorld::new();
        for (i, top) in [0.0_f32, 2.0].into_iter().enumerate() {
            world.add_collider(Collider {
                layer: Layer::Ground,
                bounds: Aabb::new(Vec3::new(-1.0, top - 0.5, -1.0), Vec3::new(1.0, top, 1.0)),
                source: ColliderSource::Obstacle { id: i as u32 },
            });
        }
        let hit = world
            .raycast(Vec3::new(0.0, 5.0, 0.0), Vec3::NEG_Y, 10.0, Layer::Ground)
            .unwrap();
        assert!((hit.distance - 3.0).abs() < 1e-6);
        assert_eq!(hit.collider.source, ColliderSource::Obstacle { id: 1 });
        assert!(world
            .raycast(Vec3::new(0.0, 5.0, 0.0), Vec3::NEG_Y, 10.0, Layer::Obstacle)
            .is_none());
    }
}
