//! Local - In-memory leaderboard for offline play

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::{LeaderboardBackend, LeaderboardEntry, LeaderboardError, PlayerRef, Session};

#[derive(Debug, Clone)]
struct Record {
    player: PlayerRef,
    score: i32,
}

#[derive(Debug, Default)]
struct LocalState {
    session: Option<PlayerRef>,
    next_player_id: u64,
    /// Leaderboard key -> member id -> best record
    boards: HashMap<String, HashMap<String, Record>>,
}

/// Leaderboard kept in process memory. Each member keeps their best score.
#[derive(Debug, Default)]
pub struct LocalLeaderboard {
    state: Mutex<LocalState>,
}

impl LocalLeaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, LocalState>, LeaderboardError> {
        self.state
            .lock()
            .map_err(|e| LeaderboardError::Other(e.to_string()))
    }
}

impl LeaderboardBackend for LocalLeaderboard {
    fn start_guest_session(&self) -> Result<Session, LeaderboardError> {
        let mut state = self.lock()?;

        let player = match &state.session {
            Some(player) => player.clone(),
            None => {
                state.next_player_id += 1;
                let player = PlayerRef {
                    id: state.next_player_id,
                    name: String::new(),
                };
                state.session = Some(player.clone());
                player
            }
        };

        Ok(Session {
            player_id: player.id,
            player_identifier: format!("guest-{}", player.id),
        })
    }

    fn set_player_name(&self, name: &str) -> Result<(), LeaderboardError> {
        let mut state = self.lock()?;
        let player = state.session.as_mut().ok_or(LeaderboardError::NoSession)?;
        player.name = name.to_string();
        Ok(())
    }

    fn submit_score(&self, member_id: &str, score: i32, leaderboard: &str) -> Result<(), LeaderboardError> {
        let mut state = self.lock()?;
        let player = state.session.clone().ok_or(LeaderboardError::NoSession)?;

        let board = state.boards.entry(leaderboard.to_string()).or_default();
        let record = board.entry(member_id.to_string()).or_insert(Record {
            player: player.clone(),
            score,
        });
        record.player = player;
        record.score = record.score.max(score);
        Ok(())
    }

    fn get_score_list(&self, leaderboard: &str, count: u32) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        let state = self.lock()?;
        if state.session.is_none() {
            return Err(LeaderboardError::NoSession);
        }

        let mut records: Vec<&Record> = state
            .boards
            .get(leaderboard)
            .map(|board| board.values().collect())
            .unwrap_or_default();
        records.sort_by(|a, b| b.score.cmp(&a.score).then(a.player.id.cmp(&b.player.id)));

        Ok(records
            .into_iter()
            .take(count as usize)
            .enumerate()
            .map(|(i, record)| LeaderboardEntry {
                rank: i as u32 + 1,
                score: record.score,
                player: Some(record.player.clone()),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calls_require_a_session() {
        let board = LocalLeaderboard::new();
        assert_eq!(board.set_player_name("x"), Err(LeaderboardError::NoSession));
        assert_eq!(board.submit_score("x", 1, "main"), Err(LeaderboardError::NoSession));
        assert_eq!(board.get_score_list("main", 5), Err(LeaderboardError::NoSession));
    }

    #[test]
    fn session_is_reused() {
        let board = LocalLeaderboard::new();
        let a = board.start_guest_session().unwrap();
        let b = board.start_guest_session().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn keeps_best_score_per_member() {
        let board = LocalLeaderboard::new();
        board.start_guest_session().unwrap();
        board.set_player_name("ana").unwrap();
        board.submit_score("ana", 120, "main").unwrap();
        board.submit_score("ana", 80, "main").unwrap();
        board.submit_score("ana-alt", 200, "main").unwrap();

        let list = board.get_score_list("main", 10).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!((list[0].rank, list[0].score), (1, 200));
        assert_eq!((list[1].rank, list[1].score), (2, 120));
        assert_eq!(list[1].player.as_ref().unwrap().name, "ana");
    }

    #[test]
    fn top_count_limits_list() {
        let board = LocalLeaderboard::new();
        board.start_guest_session().unwrap();
        for i in 0..5 {
            board.submit_score(&format!("m{}", i), i * 10, "main").unwrap();
        }
        let list = board.get_score_list("main", 3).unwrap();
        assert_eq!(list.iter().map(|e| e.score).collect::<Vec<_>>(), vec![40, 30, 20]);
        assert!(board.get_score_list("other", 3).unwrap().is_empty());
    }
}
