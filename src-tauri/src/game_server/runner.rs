//! Runner - Player locomotion and collision response
//!
//! The runner moves forward on its own at an ever-increasing speed. Input
//! can make it jump, slide or turn; falling off the track, hitting an
//! obstacle or turning where the track doesn't allow it ends the run.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::game_server::events::{GameEvent, GameOverReason};
use crate::game_server::heading::{Heading, TurnDirection};
use crate::game_server::input::InputAction;
use crate::game_server::physics::{Aabb, ColliderSource, Layer, PhysicsQuery};

/// Tunables for runner movement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub initial_speed: f32,
    pub maximum_speed: f32,
    /// Speed gained per second until the maximum
    pub speed_increase_rate: f32,
    pub jump_height: f32,
    /// Gravity at rest; it strengthens as speed grows
    pub initial_gravity: f32,
    /// Score gained per second alive
    pub score_multiplier: f32,
    /// Standing collider height
    pub height: f32,
    pub radius: f32,
    /// Length of the slide animation at normal playback speed (seconds)
    pub slide_clip_length: f32,
    pub max_animation_speed: f32,
    pub ground_probe_length: f32,
    pub fall_probe_length: f32,
    pub turn_probe_radius: f32,
    /// Collider centre at the start of a run
    pub start_position: Vec3,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            initial_speed: 4.0,
            maximum_speed: 30.0,
            speed_increase_rate: 0.1,
            jump_height: 1.0,
            initial_gravity: -9.81,
            score_multiplier: 10.0,
            height: 2.0,
            radius: 0.5,
            slide_clip_length: 1.0,
            max_animation_speed: 1.25,
            ground_probe_length: 0.2,
            fall_probe_length: 20.0,
            turn_probe_radius: 0.1,
            start_position: Vec3::new(0.0, 1.0, 0.0),
        }
    }
}

/// Runner state flags
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RunnerFlags {
    /// Accepts input and moves; cleared for good when the run ends
    pub active: bool,
    pub sliding: bool,
    pub grounded: bool,
}

impl Default for RunnerFlags {
    fn default() -> Self {
        Self {
            active: true,
            sliding: false,
            grounded: true,
        }
    }
}

/// High-level locomotion state, mostly for presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionState {
    Running,
    Airborne,
    Sliding,
    GameOver,
}

/// Complete state of the runner for one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerState {
    /// Transform origin; the collider centre is offset from it while sliding
    pub position: Vec3,
    pub heading: Heading,
    /// Forward speed (m/s)
    pub speed: f32,
    pub gravity: f32,
    pub vertical_velocity: f32,
    pub score: f32,
    /// Collider height (halved while sliding)
    pub height: f32,
    /// Vertical offset of the collider centre from `position`
    pub center_offset: f32,
    /// Seconds left in the current slide
    pub slide_remaining: f32,
    pub animation_speed: f32,
    pub flags: RunnerFlags,
    pub game_over: Option<GameOverReason>,
    last_reported_score: i32,
}

impl RunnerState {
    /// Fresh runner at the start position
    pub fn new(config: &PlayerConfig) -> Self {
        Self {
            position: config.start_position,
            heading: Heading::North,
            speed: config.initial_speed.min(config.maximum_speed),
            gravity: config.initial_gravity,
            vertical_velocity: 0.0,
            score: 0.0,
            height: config.height,
            center_offset: 0.0,
            slide_remaining: 0.0,
            animation_speed: 1.0,
            flags: RunnerFlags::default(),
            game_over: None,
            last_reported_score: 0,
        }
    }

    /// Score as reported to the outside world
    pub fn integer_score(&self) -> i32 {
        self.score as i32
    }

    pub fn is_active(&self) -> bool {
        self.flags.active
    }

    pub fn collider_center(&self) -> Vec3 {
        self.position + Vec3::new(0.0, self.center_offset, 0.0)
    }

    /// Lowest point of the collider
    pub fn feet(&self) -> Vec3 {
        self.collider_center() - Vec3::new(0.0, self.height / 2.0, 0.0)
    }

    pub fn collider_bounds(&self, radius: f32) -> Aabb {
        Aabb::from_center_size(
            self.collider_center(),
            Vec3::new(radius * 2.0, self.height, radius * 2.0),
        )
    }

    pub fn motion(&self) -> MotionState {
        if self.game_over.is_some() {
            MotionState::GameOver
        } else if self.flags.sliding {
            MotionState::Sliding
        } else if !self.flags.grounded {
            MotionState::Airborne
        } else {
            MotionState::Running
        }
    }
}

/// Runner simulation logic
pub struct Runner;

impl Runner {
    /// Ground probes start this far above the feet
    const PROBE_LIFT: f32 = 0.1;
    /// Ground probes are offset this far ahead of and behind the centre
    const PROBE_SPREAD: f32 = 0.2;

    /// Update the runner for one tick
    pub fn update(
        state: &mut RunnerState,
        config: &PlayerConfig,
        delta: f32,
        physics: &dyn PhysicsQuery,
        events: &mut Vec<GameEvent>,
    ) {
        if !state.flags.active {
            return;
        }

        // Nothing underneath at all: we ran off the track
        if !Self::is_grounded(state, physics, config.fall_probe_length) {
            Self::end_run(state, GameOverReason::Fell, events);
            return;
        }

        state.score += config.score_multiplier * delta;
        let score = state.integer_score();
        if score != state.last_reported_score {
            state.last_reported_score = score;
            events.push(GameEvent::ScoreUpdated(score));
        }

        state.position += state.heading.to_vec3() * state.speed * delta;

        // Vertical motion
        let grounded = Self::is_grounded(state, physics, config.ground_probe_length);
        if grounded && state.vertical_velocity < 0.0 {
            state.vertical_velocity = 0.0;
        }
        state.vertical_velocity += state.gravity * delta;
        state.position.y += state.vertical_velocity * delta;
        Self::settle_on_ground(state, physics);
        state.flags.grounded = Self::is_grounded(state, physics, config.ground_probe_length);

        let hits = physics.overlap_box(&state.collider_bounds(config.radius), Layer::Obstacle);
        if !hits.is_empty() {
            Self::end_run(state, GameOverReason::HitObstacle, events);
            return;
        }

        if state.flags.sliding {
            state.slide_remaining -= delta;
            if state.slide_remaining <= 0.0 {
                Self::end_slide(state, config);
            }
        }

        // Difficulty ramp
        if state.speed < config.maximum_speed {
            state.speed = (state.speed + delta * config.speed_increase_rate).min(config.maximum_speed);
            state.gravity = config.initial_gravity - state.speed;

            if state.animation_speed < config.max_animation_speed {
                state.animation_speed =
                    (state.animation_speed + delta / state.speed).min(config.max_animation_speed);
            }
        }
    }

    /// Apply a performed input action
    pub fn handle_input(
        state: &mut RunnerState,
        config: &PlayerConfig,
        action: InputAction,
        physics: &dyn PhysicsQuery,
        events: &mut Vec<GameEvent>,
    ) {
        if !state.flags.active {
            return;
        }

        match action {
            InputAction::Jump => Self::jump(state, config, physics),
            InputAction::Slide => Self::slide(state, config, physics),
            InputAction::Turn(turn) => Self::turn(state, config, turn, physics, events),
        }
    }

    /// Upward impulse, only from the ground
    pub fn jump(state: &mut RunnerState, config: &PlayerConfig, physics: &dyn PhysicsQuery) {
        if !Self::is_grounded(state, physics, config.ground_probe_length) {
            return;
        }

        state.vertical_velocity += (config.jump_height * state.gravity * -3.0).sqrt();
        state.flags.grounded = false;
        log::debug!("Jump: vertical velocity {:.2}", state.vertical_velocity);
    }

    /// Halve the collider for the length of the slide animation
    pub fn slide(state: &mut RunnerState, config: &PlayerConfig, physics: &dyn PhysicsQuery) {
        if state.flags.sliding || !Self::is_grounded(state, physics, config.ground_probe_length) {
            return;
        }

        state.height = config.height / 2.0;
        state.center_offset = -state.height / 2.0;
        state.slide_remaining = config.slide_clip_length / state.animation_speed;
        state.flags.sliding = true;
    }

    fn end_slide(state: &mut RunnerState, config: &PlayerConfig) {
        state.height = config.height;
        state.center_offset = 0.0;
        state.slide_remaining = 0.0;
        state.flags.sliding = false;
    }

    /// Turn on a turn tile, or end the run if there is none that allows it
    pub fn turn(
        state: &mut RunnerState,
        config: &PlayerConfig,
        turn: TurnDirection,
        physics: &dyn PhysicsQuery,
        events: &mut Vec<GameEvent>,
    ) {
        let Some(pivot) = Self::check_turn(state, config, turn, physics) else {
            Self::end_run(state, GameOverReason::InvalidTurn, events);
            return;
        };

        let heading = state.heading.turned(turn);
        events.push(GameEvent::DirectionChanged(heading));

        state.position = Vec3::new(pivot.x, state.position.y, pivot.z);
        state.heading = heading;
        log::debug!("Turned {:?}, now heading {:?}", turn, heading);
    }

    /// Pivot of the turn tile under the runner, if it allows this turn
    fn check_turn(
        state: &RunnerState,
        config: &PlayerConfig,
        turn: TurnDirection,
        physics: &dyn PhysicsQuery,
    ) -> Option<Vec3> {
        let hits = physics.overlap_sphere(state.position, config.turn_probe_radius, Layer::Turn);
        match hits.first()?.source {
            ColliderSource::Tile { kind, pivot, .. } if kind.allows(turn) => Some(pivot),
            _ => None,
        }
    }

    /// Two downward probes from just above the feet, one behind and one ahead
    pub fn is_grounded(state: &RunnerState, physics: &dyn PhysicsQuery, length: f32) -> bool {
        let origin = state.feet() + Vec3::new(0.0, Self::PROBE_LIFT, 0.0);
        let spread = state.heading.to_vec3() * Self::PROBE_SPREAD;

        physics
            .raycast(origin - spread, Vec3::NEG_Y, length, Layer::Ground)
            .is_some()
            || physics
                .raycast(origin + spread, Vec3::NEG_Y, length, Layer::Ground)
                .is_some()
    }

    /// Push the collider back up if it sank into the ground
    fn settle_on_ground(state: &mut RunnerState, physics: &dyn PhysicsQuery) {
        let center = state.collider_center();
        let Some(hit) = physics.raycast(center, Vec3::NEG_Y, state.height / 2.0, Layer::Ground) else {
            return;
        };

        let feet = state.feet().y;
        if feet < hit.point.y {
            state.position.y += hit.point.y - feet;
            state.vertical_velocity = state.vertical_velocity.max(0.0);
        }
    }

    fn end_run(state: &mut RunnerState, reason: GameOverReason, events: &mut Vec<GameEvent>) {
        if !state.flags.active {
            return;
        }

        state.flags.active = false;
        state.game_over = Some(reason);
        let score = state.integer_score();
        log::info!("Game over ({:?}) with score {}", reason, score);
        events.push(GameEvent::GameOver { score, reason });
    }
}

/// Compact runner state for IPC transfer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerSnapshot {
    pub position: Vec3,
    pub heading: Heading,
    pub speed: f32,
    pub score: i32,
    pub height: f32,
    pub animation_speed: f32,
    pub motion: MotionState,
}

impl From<&RunnerState> for RunnerSnapshot {
    fn from(state: &RunnerState) -> Self {
        Self {
            position: state.position,
            heading: state.heading,
            speed: state.speed,
            score: state.integer_score(),
            height: state.height,
            animation_speed: state.animation_speed,
            motion: state.motion(),
        }
    }
}
