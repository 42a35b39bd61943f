//! Game Server Module
//!
//! Runs the endless-runner simulation in Rust: track generation, runner
//! locomotion and score reporting. The frontend drives it through Tauri
//! commands and only renders snapshots.

pub mod config;
pub mod events;
pub mod heading;
pub mod hud;
pub mod input;
pub mod leaderboard;
pub mod physics;
pub mod run;
pub mod runner;
pub mod simulation;
pub mod spawner;
pub mod tile;

pub use config::{ConfigError, GameConfig};
pub use events::{EventBus, GameEvent, GameOverReason, SubscriptionId};
pub use heading::{Heading, TurnDirection};
pub use hud::{GameOverPanel, Hud};
pub use input::{InputAction, InputBindings};
pub use physics::{PhysicsQuery, TrackWorld};
pub use run::{Run, RunSnapshot, RunStatus};
pub use runner::{PlayerConfig, Runner, RunnerSnapshot, RunnerState};
pub use simulation::{GameServer, GameSnapshot, GameState, ServerStats};
pub use spawner::{TileSpawner, TrackConfig};
pub use tile::{Obstacle, Tile, TileKind};
