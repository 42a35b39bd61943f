//! Run - One attempt from the start tile to game over
//!
//! Ties the runner to the track it is running on: direction changes
//! extend the track and the collision world is rebuilt from it.

use serde::{Deserialize, Serialize};

use crate::game_server::config::GameConfig;
use crate::game_server::events::GameEvent;
use crate::game_server::input::InputAction;
use crate::game_server::physics::TrackWorld;
use crate::game_server::runner::{Runner, RunnerSnapshot, RunnerState};
use crate::game_server::spawner::TileSpawner;
use crate::game_server::tile::{Obstacle, Tile};

/// Run status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    Running,
    GameOver,
}

/// Complete run state
#[derive(Debug)]
pub struct Run {
    pub config: GameConfig,
    pub status: RunStatus,
    pub runner: RunnerState,
    pub spawner: TileSpawner,
    pub world: TrackWorld,
    /// Seconds since the run started
    pub elapsed_time: f32,
}

impl Run {
    /// Lay the opening track and place the runner at the start
    pub fn new(config: GameConfig) -> Self {
        let mut spawner = TileSpawner::new(config.track.clone());
        spawner.start();
        let world = TrackWorld::from_track(spawner.tiles(), spawner.obstacles());
        let runner = RunnerState::new(&config.player);

        Self {
            config,
            status: RunStatus::Running,
            runner,
            spawner,
            world,
            elapsed_time: 0.0,
        }
    }

    /// Advance the run by `delta` seconds
    pub fn update(&mut self, delta: f32) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.status != RunStatus::Running {
            return events;
        }

        self.elapsed_time += delta;
        Runner::update(&mut self.runner, &self.config.player, delta, &self.world, &mut events);
        self.route(&events);
        events
    }

    pub fn handle_input(&mut self, action: InputAction) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.status != RunStatus::Running {
            return events;
        }

        Runner::handle_input(&mut self.runner, &self.config.player, action, &self.world, &mut events);
        self.route(&events);
        events
    }

    fn route(&mut self, events: &[GameEvent]) {
        for event in events {
            match event {
                GameEvent::DirectionChanged(heading) => {
                    self.spawner.advance(*heading);
                    self.world = TrackWorld::from_track(self.spawner.tiles(), self.spawner.obstacles());
                }
                GameEvent::GameOver { .. } => {
                    self.status = RunStatus::GameOver;
                }
                _ => {}
            }
        }
    }

    pub fn score(&self) -> i32 {
        self.runner.integer_score()
    }

    /// Get compact snapshot for IPC transfer
    pub fn get_snapshot(&self) -> RunSnapshot {
        RunSnapshot {
            status: self.status,
            elapsed_time: self.elapsed_time,
            runner: RunnerSnapshot::from(&self.runner),
            tiles: self.spawner.tiles().to_vec(),
            obstacles: self.spawner.obstacles().to_vec(),
        }
    }
}

/// Compact run snapshot for IPC transfer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSnapshot {
    pub status: RunStatus,
    pub elapsed_time: f32,
    pub runner: RunnerSnapshot,
    pub tiles: Vec<Tile>,
    pub obstacles: Vec<Obstacle>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_server::events::GameOverReason;
    use crate::game_server::heading::{Heading, TurnDirection};
    use crate::game_server::tile::{TileKind, TilePrefab};
    use glam::Vec3;

    /// Seeded track whose only turn is a right corner, without obstacles
    fn config() -> GameConfig {
        let mut config = GameConfig::default();
        config.track.seed = Some(11);
        config.track.obstacle_chance = 0.0;
        config.track.catalog.turn_tiles = vec![TilePrefab::new(
            "right_turn",
            TileKind::Right,
            Vec3::new(4.0, 0.5, 4.0),
        )];
        config
    }

    fn turn_tile(run: &Run) -> Tile {
        run.spawner
            .tiles()
            .iter()
            .find(|t| t.kind.is_turn())
            .cloned()
            .unwrap()
    }

    #[test]
    fn new_run_is_on_the_track() {
        let mut run = Run::new(config());
        assert_eq!(run.status, RunStatus::Running);
        assert_eq!(run.spawner.tiles().len(), 11);
        assert!(!run.world.is_empty());

        for _ in 0..50 {
            run.update(0.02);
        }
        assert_eq!(run.status, RunStatus::Running);
        assert!(run.runner.position.z > 3.9);
        assert!((run.elapsed_time - 1.0).abs() < 1e-3);
    }

    #[test]
    fn turning_extends_the_track() {
        let mut run = Run::new(config());
        let corner = turn_tile(&run);
        run.runner.position = Vec3::new(corner.position.x, 1.0, corner.position.z);

        let events = run.handle_input(InputAction::Turn(TurnDirection::Right));
        assert_eq!(events, vec![GameEvent::DirectionChanged(Heading::East)]);
        assert_eq!(run.runner.heading, Heading::East);

        // The corner survives as the anchor, the rest is new
        let tiles = run.spawner.tiles();
        assert_eq!(tiles[0].id, corner.id);
        assert!(tiles.len() >= 2 + run.config.track.minimum_straight_tiles as usize);
        assert!(tiles[1..].iter().all(|t| t.heading == Heading::East));
        assert_eq!(tiles[1].position, corner.position + Vec3::new(4.0, 0.0, 0.0));

        // And the runner keeps going on the new straight
        for _ in 0..50 {
            run.update(0.02);
        }
        assert_eq!(run.status, RunStatus::Running);
        assert!(run.runner.position.x > corner.position.x + 3.9);
    }

    #[test]
    fn turning_on_a_straight_ends_the_run() {
        let mut run = Run::new(config());
        let events = run.handle_input(InputAction::Turn(TurnDirection::Left));

        assert!(events.contains(&GameEvent::GameOver {
            score: 0,
            reason: GameOverReason::InvalidTurn,
        }));
        assert_eq!(run.status, RunStatus::GameOver);
        assert_eq!(run.spawner.tiles().len(), 11);
    }

    #[test]
    fn leaving_the_track_ends_the_run() {
        let mut run = Run::new(config());
        run.runner.position = Vec3::new(0.0, 1.0, 500.0);

        let events = run.update(0.02);
        assert!(events.contains(&GameEvent::GameOver {
            score: 0,
            reason: GameOverReason::Fell,
        }));

        // Frozen afterwards
        assert!(run.update(0.02).is_empty());
        assert!(run.handle_input(InputAction::Jump).is_empty());
        assert_eq!(run.get_snapshot().status, RunStatus::GameOver);
    }
}
