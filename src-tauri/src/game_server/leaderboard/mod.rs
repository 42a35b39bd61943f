//! Leaderboard - Player sessions, score submission and the top-N board
//!
//! The remote service is reached through `LeaderboardBackend`. All calls
//! block, so `ScoreReporter` runs them on a worker thread and the game
//! polls for progress once per tick (fire-and-poll).

pub mod backend;
pub mod board;
pub mod http;
pub mod local;
pub mod reporter;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use backend::LeaderboardBackend;
pub use board::{Leaderboard, LeaderboardRow};
pub use http::HttpLeaderboard;
pub use local::LocalLeaderboard;
pub use reporter::{ReportStatus, ReportStep, ScoreReporter};

/// Player attached to a leaderboard entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRef {
    pub id: u64,
    /// Display name; may be empty if the player never set one
    pub name: String,
}

/// One row of a fetched score list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub score: i32,
    pub player: Option<PlayerRef>,
}

/// An established guest session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub player_id: u64,
    pub player_identifier: String,
}

/// Leaderboard error types
#[derive(Debug, Clone, PartialEq)]
pub enum LeaderboardError {
    /// Transport failure (DNS, connection, TLS, timeout inside the client)
    Network(String),
    /// Non-success HTTP status
    Status { code: u16, body: String },
    /// Response body didn't match the expected shape
    Decode(String),
    /// A call that needs a session was made before one was established
    NoSession,
    /// The service answered but refused the request
    Rejected(String),
    /// The whole job took longer than its deadline
    TimedOut,
    /// The worker went away without reporting a result
    Disconnected,
    /// Local failure (thread spawn, poisoned state)
    Other(String),
}

impl fmt::Display for LeaderboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeaderboardError::Network(msg) => write!(f, "network error: {}", msg),
            LeaderboardError::Status { code, body } => write!(f, "HTTP {}: {}", code, body),
            LeaderboardError::Decode(msg) => write!(f, "bad response: {}", msg),
            LeaderboardError::NoSession => write!(f, "no session established"),
            LeaderboardError::Rejected(msg) => write!(f, "rejected: {}", msg),
            LeaderboardError::TimedOut => write!(f, "timed out"),
            LeaderboardError::Disconnected => write!(f, "worker disconnected"),
            LeaderboardError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for LeaderboardError {}

/// Which backend to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    Http,
    Local,
}

/// Order of the submit and fetch steps after game over
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportOrder {
    /// Submit, then show a board that includes the new score
    #[default]
    SubmitThenFetch,
    /// Show the board straight away, then submit
    FetchThenSubmit,
}

/// Leaderboard configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeaderboardConfig {
    pub backend: BackendKind,
    pub base_url: String,
    pub game_key: String,
    pub game_version: String,
    pub leaderboard_key: String,
    pub top_count: u32,
    /// Per-request timeout inside the HTTP client
    pub request_timeout_ms: u64,
    /// Deadline for a whole connect or report job
    pub job_timeout_ms: u64,
    pub player_name: String,
    pub order: ReportOrder,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Http,
            base_url: "https://api.lootlocker.io".to_string(),
            game_key: String::new(),
            game_version: "0.1.0.0".to_string(),
            leaderboard_key: "globalHighscore".to_string(),
            top_count: 10,
            request_timeout_ms: 10_000,
            job_timeout_ms: 30_000,
            player_name: "Runner".to_string(),
            order: ReportOrder::SubmitThenFetch,
        }
    }
}

impl LeaderboardConfig {
    /// Build the configured backend. Without a game key the remote
    /// service can't be used, so play continues against a local board.
    pub fn build_backend(&self) -> Arc<dyn LeaderboardBackend> {
        match self.backend {
            BackendKind::Http if !self.game_key.is_empty() => {
                log::info!("Using remote leaderboard at {}", self.base_url);
                Arc::new(HttpLeaderboard::new(self))
            }
            BackendKind::Http => {
                log::warn!("No leaderboard game key configured; using local leaderboard");
                Arc::new(LocalLeaderboard::new())
            }
            BackendKind::Local => {
                log::info!("Using local leaderboard");
                Arc::new(LocalLeaderboard::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_fill_missing_fields() {
        let config: LeaderboardConfig =
            serde_json::from_str(r#"{ "leaderboard_key": "weekly", "order": "fetch_then_submit" }"#)
                .unwrap();
        assert_eq!(config.leaderboard_key, "weekly");
        assert_eq!(config.order, ReportOrder::FetchThenSubmit);
        assert_eq!(config.top_count, 10);
        assert_eq!(config.backend, BackendKind::Http);
    }

    #[test]
    fn missing_game_key_falls_back_to_local() {
        let backend = LeaderboardConfig::default().build_backend();
        let session = backend.start_guest_session().unwrap();
        assert!(session.player_identifier.starts_with("guest-"));
    }

    #[test]
    fn error_messages() {
        let err = LeaderboardError::Status {
            code: 401,
            body: "unauthorized".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 401: unauthorized");
        assert_eq!(LeaderboardError::TimedOut.to_string(), "timed out");
    }
}
