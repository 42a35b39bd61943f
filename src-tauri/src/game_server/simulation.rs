//! Simulation - Main game server and loop
//!
//! Manages the game server state, handles tick updates, and
//! provides the interface for Tauri commands.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::game_server::config::GameConfig;
use crate::game_server::events::{EventBus, GameEvent, SubscriptionId};
use crate::game_server::hud::Hud;
use crate::game_server::input::InputAction;
use crate::game_server::leaderboard::{Leaderboard, LeaderboardBackend, ReportStatus, ScoreReporter};
use crate::game_server::run::{Run, RunSnapshot};

/// Longest frame the simulation will integrate in one step
const MAX_FRAME_DELTA: f32 = 0.1;

/// Game state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    Idle,
    Running,
    Paused,
    GameOver,
}

/// Server statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerStats {
    pub tick_rate: f32,
    pub avg_tick_time_ms: f32,
    pub tile_count: u32,
    pub obstacle_count: u32,
    pub game_state: GameState,
    pub report_status: ReportStatus,
}

/// Everything the frontend draws in one frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub state: GameState,
    pub run: RunSnapshot,
    pub hud: Hud,
}

/// Main game server
pub struct GameServer {
    config: GameConfig,
    /// Current game state
    state: GameState,
    /// Active run (if any)
    run: Option<Run>,
    reporter: ScoreReporter,
    events: EventBus,
    hud: Hud,
    /// Target tick rate (ticks per second)
    tick_rate: f32,
    /// Last tick timestamp
    last_tick: Instant,
    /// Recent tick durations for averaging
    tick_times: Vec<f32>,
}

impl GameServer {
    /// Create a game server using the configured leaderboard backend
    pub fn new(config: GameConfig) -> Self {
        let backend = config.leaderboard.build_backend();
        Self::with_backend(config, backend)
    }

    /// Create a game server around an existing leaderboard backend and
    /// start connecting to it
    pub fn with_backend(config: GameConfig, backend: Arc<dyn LeaderboardBackend>) -> Self {
        let mut reporter = ScoreReporter::new(backend, config.leaderboard.clone());
        reporter.connect();

        Self {
            config,
            state: GameState::Idle,
            run: None,
            reporter,
            events: EventBus::new(),
            hud: Hud::new(),
            tick_rate: 60.0,
            last_tick: Instant::now(),
            tick_times: Vec::with_capacity(60),
        }
    }

    /// Begin a fresh run, replacing any previous one
    pub fn start_run(&mut self) {
        self.run = Some(Run::new(self.config.clone()));
        self.hud.reset();
        self.reporter.reset();
        self.state = GameState::Running;
        self.last_tick = Instant::now();
        log::info!("Run started");
    }

    pub fn restart(&mut self) {
        log::info!("Restarting run");
        self.start_run();
    }

    /// Perform a single simulation tick using wall-clock time
    pub fn tick(&mut self) -> Option<GameSnapshot> {
        let now = Instant::now();
        let delta = now.duration_since(self.last_tick).as_secs_f32().min(MAX_FRAME_DELTA);
        self.last_tick = now;

        // Track tick timing
        let tick_start = Instant::now();
        self.advance(delta);

        let tick_time = tick_start.elapsed().as_secs_f32() * 1000.0;
        self.tick_times.push(tick_time);
        if self.tick_times.len() > 60 {
            self.tick_times.remove(0);
        }

        self.get_snapshot()
    }

    /// Step the simulation by `delta` seconds and poll the leaderboard.
    /// Returns every event raised during the step.
    pub fn advance(&mut self, delta: f32) -> Vec<GameEvent> {
        let mut events = Vec::new();

        if self.state == GameState::Running {
            if let Some(run) = &mut self.run {
                events.extend(run.update(delta));
            }
        }
        events.extend(self.reporter.poll());

        self.dispatch(&events);
        events
    }

    /// Apply an input action to the active run
    pub fn handle_input(&mut self, action: InputAction) -> Vec<GameEvent> {
        if self.state != GameState::Running {
            return Vec::new();
        }
        let Some(run) = &mut self.run else {
            return Vec::new();
        };

        let events = run.handle_input(action);
        self.dispatch(&events);
        events
    }

    /// Turn from a signed axis value; a centred axis does nothing
    pub fn turn_axis(&mut self, value: f32) -> Vec<GameEvent> {
        match InputAction::turn_from_axis(value) {
            Some(action) => self.handle_input(action),
            None => Vec::new(),
        }
    }

    /// Resolve a key through the input bindings. Returns false for
    /// unbound keys.
    pub fn press_key(&mut self, key: &str) -> bool {
        match self.config.input.resolve(key) {
            Some(action) => {
                self.handle_input(action);
                true
            }
            None => {
                log::debug!("Unbound key {}", key);
                false
            }
        }
    }

    fn dispatch(&mut self, events: &[GameEvent]) {
        for event in events {
            if let GameEvent::GameOver { score, .. } = event {
                self.state = GameState::GameOver;
                self.reporter.report(*score);
            }
            self.hud.apply(event);
            self.events.publish(event);
        }
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&GameEvent) + Send + 'static,
    {
        self.events.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Name submitted with the next score
    pub fn set_player_name(&mut self, name: &str) {
        self.reporter.set_player_name(name);
        log::info!("Player name set to {}", name);
    }

    /// Board fetched after the last game over
    pub fn leaderboard(&self) -> Option<&Leaderboard> {
        self.reporter.board()
    }

    pub fn hud(&self) -> &Hud {
        &self.hud
    }

    /// Get current snapshot without advancing the simulation
    pub fn get_snapshot(&self) -> Option<GameSnapshot> {
        self.run.as_ref().map(|run| GameSnapshot {
            state: self.state,
            run: run.get_snapshot(),
            hud: self.hud.clone(),
        })
    }

    /// Get server statistics
    pub fn get_stats(&self) -> ServerStats {
        let avg_tick_time = if self.tick_times.is_empty() {
            0.0
        } else {
            self.tick_times.iter().sum::<f32>() / self.tick_times.len() as f32
        };

        ServerStats {
            tick_rate: self.tick_rate,
            avg_tick_time_ms: avg_tick_time,
            tile_count: self.run.as_ref().map(|r| r.spawner.tiles().len() as u32).unwrap_or(0),
            obstacle_count: self
                .run
                .as_ref()
                .map(|r| r.spawner.obstacles().len() as u32)
                .unwrap_or(0),
            game_state: self.state,
            report_status: self.reporter.status().clone(),
        }
    }

    /// Get current game state
    pub fn get_state(&self) -> GameState {
        self.state
    }

    /// Pause the simulation
    pub fn pause(&mut self) {
        if self.state == GameState::Running {
            self.state = GameState::Paused;
        }
    }

    /// Resume the simulation
    pub fn resume(&mut self) {
        if self.state == GameState::Paused {
            self.state = GameState::Running;
            self.last_tick = Instant::now();
        }
    }
}

impl Default for GameServer {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}
