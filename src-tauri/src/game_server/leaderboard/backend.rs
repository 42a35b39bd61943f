//! Backend - Operations the reporter needs from a leaderboard service

use super::{LeaderboardEntry, LeaderboardError, Session};

/// A leaderboard service. Calls block until the service answers.
///
/// Implementations keep whatever session state they need internally;
/// callers establish a session before any other call.
pub trait LeaderboardBackend: Send + Sync {
    fn start_guest_session(&self) -> Result<Session, LeaderboardError>;

    fn set_player_name(&self, name: &str) -> Result<(), LeaderboardError>;

    fn submit_score(&self, member_id: &str, score: i32, leaderboard: &str) -> Result<(), LeaderboardError>;

    /// Top `count` entries in rank order
    fn get_score_list(&self, leaderboard: &str, count: u32) -> Result<Vec<LeaderboardEntry>, LeaderboardError>;
}
