//! Spawner - Procedural endless track generation
//!
//! Keeps an ordered list of tiles ahead of the runner. When the runner
//! takes a turn, everything behind the turn tile is dropped and a fresh
//! straight run (ending in another turn tile) is laid in the new heading.

use std::time::{SystemTime, UNIX_EPOCH};

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::game_server::heading::Heading;
use crate::game_server::tile::{
    Obstacle, ObstacleId, ObstaclePrefab, Tile, TileCatalog, TileId, TileKind, TilePrefab,
};

/// Track generation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackConfig {
    /// Straight tiles laid before the first turn
    pub tile_start_count: u32,
    /// Shortest straight run after a turn (inclusive)
    pub minimum_straight_tiles: u32,
    /// Longest straight run after a turn (exclusive)
    pub maximum_straight_tiles: u32,
    /// Probability that a straight tile carries an obstacle
    pub obstacle_chance: f32,
    /// Fixed RNG seed; wall-clock milliseconds when unset
    pub seed: Option<u64>,
    pub catalog: TileCatalog,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            tile_start_count: 10,
            minimum_straight_tiles: 3,
            maximum_straight_tiles: 15,
            obstacle_chance: 0.4,
            seed: None,
            catalog: TileCatalog::default(),
        }
    }
}

/// Result of laying a new stretch of track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvanceReport {
    pub straight_tiles: u32,
    pub obstacles: u32,
    pub turn_tile: Option<TileKind>,
    pub removed_tiles: u32,
}

/// Procedural track generator
#[derive(Debug, Clone)]
pub struct TileSpawner {
    config: TrackConfig,
    rng: StdRng,
    /// Where the next tile goes
    cursor: Vec3,
    heading: Heading,
    tiles: Vec<Tile>,
    obstacles: Vec<Obstacle>,
    next_tile_id: TileId,
    next_obstacle_id: ObstacleId,
}

impl TileSpawner {
    /// Create a spawner with an empty track
    pub fn new(config: TrackConfig) -> Self {
        let seed = config.seed.unwrap_or_else(wall_clock_millis);
        log::debug!("Track generator seeded with {}", seed);

        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
            cursor: Vec3::ZERO,
            heading: Heading::North,
            tiles: Vec::new(),
            obstacles: Vec::new(),
            next_tile_id: 0,
            next_obstacle_id: 0,
        }
    }

    /// Lay the opening straight followed by the first turn
    pub fn start(&mut self) {
        let straight = self.config.catalog.straight.clone();
        for _ in 0..self.config.tile_start_count {
            self.spawn_tile(&straight, false);
        }

        let turn = self.select_turn_tile();
        if let Some(turn) = &turn {
            self.spawn_tile(turn, false);
        }

        log::info!(
            "Track started: {} straight tiles, first turn {:?}",
            self.config.tile_start_count,
            turn.map(|t| t.kind)
        );
    }

    /// Continue the track in a new heading from the current turn tile.
    ///
    /// All tiles except the most recent one (the anchor the runner is
    /// standing on) are removed, along with every obstacle.
    pub fn advance(&mut self, heading: Heading) -> AdvanceReport {
        self.heading = heading;
        let removed_tiles = self.delete_previous_tiles();

        let offset = self.tiles.last().map(|anchor| self.placement_offset(anchor));
        if let Some(offset) = offset {
            self.cursor += offset;
        }

        let (min, max) = (
            self.config.minimum_straight_tiles,
            self.config.maximum_straight_tiles,
        );
        let run_length = if max > min {
            self.rng.gen_range(min..max)
        } else {
            min
        };

        let straight = self.config.catalog.straight.clone();
        let obstacles_before = self.obstacles.len();
        for i in 0..run_length {
            self.spawn_tile(&straight, i != 0);
        }

        let turn = self.select_turn_tile();
        if let Some(turn) = &turn {
            self.spawn_tile(turn, false);
        }

        let report = AdvanceReport {
            straight_tiles: run_length,
            obstacles: (self.obstacles.len() - obstacles_before) as u32,
            turn_tile: turn.map(|t| t.kind),
            removed_tiles,
        };
        log::info!(
            "Track advanced {:?}: {} straight tiles, {} obstacles, turn {:?}",
            heading,
            report.straight_tiles,
            report.obstacles,
            report.turn_tile
        );
        report
    }

    /// Offset from the anchor to the first tile of the next run.
    ///
    /// A junction is entered from its middle, so half its extent is enough;
    /// corner tiles are trimmed by a fixed margin instead.
    fn placement_offset(&self, anchor: &Tile) -> Vec3 {
        let half_collider = Vec3::splat(self.config.catalog.straight.collider_length() / 2.0);
        let direction = self.heading.to_vec3();

        if anchor.kind == TileKind::Sideways {
            (anchor.size / 2.0 + half_collider) * direction
        } else {
            (anchor.size - Vec3::splat(2.0) + half_collider) * direction
        }
    }

    fn spawn_tile(&mut self, prefab: &TilePrefab, should_spawn_obstacle: bool) {
        let tile = Tile::from_prefab(self.next_tile_id, prefab, self.cursor, self.heading);
        self.next_tile_id += 1;

        let advance = tile.size * self.heading.to_vec3();
        let is_straight = tile.kind == TileKind::Straight;
        self.tiles.push(tile);

        if should_spawn_obstacle {
            self.spawn_obstacle();
        }

        if is_straight {
            self.cursor += advance;
        }
    }

    fn spawn_obstacle(&mut self) {
        if self.rng.gen::<f32>() > self.config.obstacle_chance {
            return;
        }

        let Some(prefab) = self.select_obstacle() else {
            return;
        };

        let obstacle =
            Obstacle::from_prefab(self.next_obstacle_id, &prefab, self.cursor, self.heading);
        self.next_obstacle_id += 1;
        self.obstacles.push(obstacle);
    }

    fn select_turn_tile(&mut self) -> Option<TilePrefab> {
        let choice = select_random(&mut self.rng, &self.config.catalog.turn_tiles).cloned();
        if choice.is_none() {
            log::warn!("No turn tiles configured; track will end without a turn");
        }
        choice
    }

    fn select_obstacle(&mut self) -> Option<ObstaclePrefab> {
        let choice = select_random(&mut self.rng, &self.config.catalog.obstacles).cloned();
        if choice.is_none() {
            log::warn!("No obstacles configured; skipping obstacle");
        }
        choice
    }

    fn delete_previous_tiles(&mut self) -> u32 {
        let removed = self.tiles.len().saturating_sub(1);
        self.tiles.drain(..removed);
        self.obstacles.clear();
        removed as u32
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

}

/// Uniform pick from a pool; `None` when the pool is empty
fn select_random<'a, T>(rng: &mut StdRng, pool: &'a [T]) -> Option<&'a T> {
    if pool.is_empty() {
        return None;
    }
    pool.get(rng.gen_range(0..pool.len()))
}

fn wall_clock_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::from(d.subsec_millis()))
        .unwrap_or(0)
}
