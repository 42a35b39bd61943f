//! Tile - Track segments, obstacles and the prefab catalog they come from
//!
//! Prefabs are authored facing north. A placed tile's `position` is the
//! centre of its footprint on the walking surface; the slab extends
//! downward from there.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::game_server::heading::{Heading, TurnDirection};
use crate::game_server::physics::Aabb;

pub type TileId = u32;
pub type ObstacleId = u32;

/// Kind of track segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileKind {
    Straight,
    Left,
    Right,
    /// Junction that allows turning either way
    Sideways,
}

impl TileKind {
    /// Whether a runner standing on this tile may turn the given way
    pub fn allows(self, turn: TurnDirection) -> bool {
        match self {
            TileKind::Sideways => true,
            TileKind::Left => turn == TurnDirection::Left,
            TileKind::Right => turn == TurnDirection::Right,
            TileKind::Straight => false,
        }
    }

    pub fn is_turn(self) -> bool {
        self != TileKind::Straight
    }
}

/// Template a tile is instantiated from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TilePrefab {
    pub name: String,
    pub kind: TileKind,
    /// Extent facing north (x = width, y = slab thickness, z = length)
    pub size: Vec3,
    /// Turn pivot relative to the tile centre, facing north
    #[serde(default)]
    pub pivot_offset: Vec3,
}

impl TilePrefab {
    pub fn new(name: &str, kind: TileKind, size: Vec3) -> Self {
        Self {
            name: name.to_string(),
            kind,
            size,
            pivot_offset: Vec3::ZERO,
        }
    }

    /// Length of the walkable collider along the direction of travel
    pub fn collider_length(&self) -> f32 {
        self.size.z
    }
}

/// Template an obstacle is instantiated from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstaclePrefab {
    pub name: String,
    /// Extent facing north
    pub size: Vec3,
    /// Height of the obstacle's underside above the walking surface
    #[serde(default)]
    pub elevation: f32,
}

impl ObstaclePrefab {
    pub fn new(name: &str, size: Vec3, elevation: f32) -> Self {
        Self {
            name: name.to_string(),
            size,
            elevation,
        }
    }
}

/// Every prefab the track generator can place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileCatalog {
    pub straight: TilePrefab,
    pub turn_tiles: Vec<TilePrefab>,
    pub obstacles: Vec<ObstaclePrefab>,
}

impl Default for TileCatalog {
    fn default() -> Self {
        Self {
            straight: TilePrefab::new("straight", TileKind::Straight, Vec3::new(4.0, 0.5, 4.0)),
            turn_tiles: vec![
                TilePrefab::new("left_turn", TileKind::Left, Vec3::new(4.0, 0.5, 4.0)),
                TilePrefab::new("right_turn", TileKind::Right, Vec3::new(4.0, 0.5, 4.0)),
                TilePrefab::new("t_junction", TileKind::Sideways, Vec3::new(12.0, 0.5, 4.0)),
            ],
            obstacles: vec![
                // Jump over
                ObstaclePrefab::new("low_barrier", Vec3::new(3.6, 0.8, 0.5), 0.0),
                // Slide under
                ObstaclePrefab::new("high_beam", Vec3::new(3.6, 1.0, 0.5), 1.2),
            ],
        }
    }
}

/// A placed track segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub id: TileId,
    pub name: String,
    pub kind: TileKind,
    pub heading: Heading,
    pub position: Vec3,
    /// World-space extent
    pub size: Vec3,
    pub pivot: Vec3,
}

impl Tile {
    pub fn from_prefab(id: TileId, prefab: &TilePrefab, position: Vec3, heading: Heading) -> Self {
        Self {
            id,
            name: prefab.name.clone(),
            kind: prefab.kind,
            heading,
            position,
            size: heading.rotate_extent(prefab.size),
            pivot: position + heading.rotate_extent(prefab.pivot_offset) * signs(heading),
        }
    }

    /// Slab bounds; the top face is the walking surface
    pub fn bounds(&self) -> Aabb {
        let half = Vec3::new(self.size.x * 0.5, 0.0, self.size.z * 0.5);
        Aabb::new(
            self.position - half - Vec3::new(0.0, self.size.y, 0.0),
            self.position + half,
        )
    }

    /// Central square of the footprint where a turn can be taken
    pub fn turn_area(&self, reach: f32) -> Aabb {
        let side = self.size.x.min(self.size.z) * 0.5;
        Aabb::new(
            self.position - Vec3::new(side, 0.0, side),
            self.position + Vec3::new(side, reach, side),
        )
    }
}

/// A placed obstacle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: ObstacleId,
    pub name: String,
    pub heading: Heading,
    pub position: Vec3,
    pub size: Vec3,
    pub elevation: f32,
}

impl Obstacle {
    pub fn from_prefab(id: ObstacleId, prefab: &ObstaclePrefab, position: Vec3, heading: Heading) -> Self {
        Self {
            id,
            name: prefab.name.clone(),
            heading,
            position,
            size: heading.rotate_extent(prefab.size),
            elevation: prefab.elevation,
        }
    }

    pub fn bounds(&self) -> Aabb {
        let half = Vec3::new(self.size.x * 0.5, 0.0, self.size.z * 0.5);
        let lift = Vec3::new(0.0, self.elevation, 0.0);
        Aabb::new(
            self.position - half + lift,
            self.position + half + lift + Vec3::new(0.0, self.size.y, 0.0),
        )
    }
}

// Pivot offsets are authored facing north; flip them when the tile faces away.
fn signs(heading: Heading) -> Vec3 {
    match heading {
        Heading::North => Vec3::ONE,
        Heading::East => Vec3::new(1.0, 1.0, -1.0),
        Heading::South => Vec3::new(-1.0, 1.0, -1.0),
        Heading::West => Vec3::new(-1.0, 1.0, 1.0),
    }
}
