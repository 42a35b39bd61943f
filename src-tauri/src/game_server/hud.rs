//! HUD - Score text and the game-over panel
//!
//! Pure view model: it only reacts to game events, the frontend draws it.

use serde::{Deserialize, Serialize};

use crate::game_server::events::{GameEvent, GameOverReason};

/// Shown once the run ends
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameOverPanel {
    pub visible: bool,
    pub final_score: i32,
    pub reason: Option<GameOverReason>,
    /// "1. name" lines
    pub names: String,
    pub scores: String,
    /// Leaderboard progress line
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hud {
    pub score_text: String,
    pub game_over: GameOverPanel,
}

impl Default for Hud {
    fn default() -> Self {
        Self {
            score_text: "0".to_string(),
            game_over: GameOverPanel::default(),
        }
    }
}

impl Hud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, event: &GameEvent) {
        match event {
            GameEvent::ScoreUpdated(score) => {
                self.score_text = score.to_string();
            }
            GameEvent::GameOver { score, reason } => {
                self.score_text = score.to_string();
                self.game_over = GameOverPanel {
                    visible: true,
                    final_score: *score,
                    reason: Some(*reason),
                    status: "Submitting score...".to_string(),
                    ..Default::default()
                };
            }
            GameEvent::LeaderboardReady(board) => {
                self.game_over.names = board.names_column();
                self.game_over.scores = board.scores_column();
                self.game_over.status = if board.is_empty() {
                    "No scores yet".to_string()
                } else {
                    String::new()
                };
            }
            GameEvent::ReportFailed(message) => {
                // Only relevant once the panel is up
                if self.game_over.visible {
                    self.game_over.status = format!("Leaderboard unavailable: {}", message);
                }
            }
            GameEvent::DirectionChanged(_) | GameEvent::PlayerConnected => {}
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_server::leaderboard::{Leaderboard, LeaderboardRow};

    fn board() -> Leaderboard {
        Leaderboard {
            rows: vec![
                LeaderboardRow {
                    rank: 1,
                    name: "ana".to_string(),
                    score: 310,
                },
                LeaderboardRow {
                    rank: 2,
                    name: "17".to_string(),
                    score: 42,
                },
            ],
        }
    }

    #[test]
    fn score_text_follows_updates() {
        let mut hud = Hud::new();
        assert_eq!(hud.score_text, "0");
        hud.apply(&GameEvent::ScoreUpdated(12));
        assert_eq!(hud.score_text, "12");
        assert!(!hud.game_over.visible);
    }

    #[test]
    fn game_over_then_board() {
        let mut hud = Hud::new();
        hud.apply(&GameEvent::GameOver {
            score: 42,
            reason: GameOverReason::Fell,
        });
        assert!(hud.game_over.visible);
        assert_eq!(hud.game_over.final_score, 42);
        assert_eq!(hud.game_over.reason, Some(GameOverReason::Fell));

        hud.apply(&GameEvent::LeaderboardReady(board()));
        assert_eq!(hud.game_over.names, "1. ana\n2. 17\n");
        assert_eq!(hud.game_over.scores, "310\n42\n");
        assert_eq!(hud.game_over.status, "");
    }

    #[test]
    fn failure_before_game_over_is_ignored() {
        let mut hud = Hud::new();
        hud.apply(&GameEvent::ReportFailed("timed out".to_string()));
        assert_eq!(hud.game_over.status, "");

        hud.apply(&GameEvent::GameOver {
            score: 1,
            reason: GameOverReason::HitObstacle,
        });
        hud.apply(&GameEvent::ReportFailed("timed out".to_string()));
        assert_eq!(hud.game_over.status, "Leaderboard unavailable: timed out");
    }

    #[test]
    fn reset_hides_panel() {
        let mut hud = Hud::new();
        hud.apply(&GameEvent::GameOver {
            score: 5,
            reason: GameOverReason::InvalidTurn,
        });
        hud.reset();
        assert_eq!(hud, Hud::default());
    }
}
