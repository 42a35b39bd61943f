//! Board - Fetched score list rendered for display

use serde::{Deserialize, Serialize};

use super::LeaderboardEntry;

/// A displayable leaderboard row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardRow {
    pub rank: u32,
    pub name: String,
    pub score: i32,
}

/// Leaderboard ready for display
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaderboard {
    pub rows: Vec<LeaderboardRow>,
}

impl Leaderboard {
    /// Rows in rank order. Entries without a player are skipped, and a
    /// player who never set a name is shown by id.
    pub fn from_entries(entries: &[LeaderboardEntry]) -> Self {
        let mut rows: Vec<LeaderboardRow> = entries
            .iter()
            .filter_map(|entry| {
                let player = entry.player.as_ref()?;
                let name = if player.name.is_empty() {
                    player.id.to_string()
                } else {
                    player.name.clone()
                };
                Some(LeaderboardRow {
                    rank: entry.rank,
                    name,
                    score: entry.score,
                })
            })
            .collect();

        rows.sort_by_key(|row| row.rank);
        Self { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// "1. name" lines
    pub fn names_column(&self) -> String {
        self.rows
            .iter()
            .map(|row| format!("{}. {}\n", row.rank, row.name))
            .collect()
    }

    pub fn scores_column(&self) -> String {
        self.rows
            .iter()
            .map(|row| format!("{}\n", row.score))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_server::leaderboard::PlayerRef;

    fn entry(rank: u32, score: i32, player: Option<(u64, &str)>) -> LeaderboardEntry {
        LeaderboardEntry {
            rank,
            score,
            player: player.map(|(id, name)| PlayerRef {
                id,
                name: name.to_string(),
            }),
        }
    }

    #[test]
    fn skips_entries_without_player() {
        let board = Leaderboard::from_entries(&[
            entry(1, 300, Some((7, "ana"))),
            entry(2, 200, None),
            entry(3, 100, Some((9, "bo"))),
        ]);
        assert_eq!(board.rows.len(), 2);
        assert_eq!(board.rows[1].rank, 3);
    }

    #[test]
    fn empty_name_falls_back_to_id() {
        let board = Leaderboard::from_entries(&[entry(1, 50, Some((4242, "")))]);
        assert_eq!(board.rows[0].name, "4242");
    }

    #[test]
    fn rows_are_in_rank_order() {
        let board = Leaderboard::from_entries(&[
            entry(2, 20, Some((2, "second"))),
            entry(1, 30, Some((1, "first"))),
        ]);
        assert_eq!(board.names_column(), "1. first\n2. second\n");
        assert_eq!(board.scores_column(), "30\n20\n");
    }

    #[test]
    fn empty_board() {
        let board = Leaderboard::from_entries(&[]);
        assert!(board.is_empty());
        assert_eq!(board.names_column(), "");
    }
}
