//! Events - Outbound notifications and their subscribers

use serde::{Deserialize, Serialize};

use crate::game_server::heading::Heading;
use crate::game_server::leaderboard::Leaderboard;

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOverReason {
    Fell,
    HitObstacle,
    InvalidTurn,
}

/// Something other parts of the game (or the frontend) react to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "snake_case")]
pub enum GameEvent {
    DirectionChanged(Heading),
    GameOver { score: i32, reason: GameOverReason },
    ScoreUpdated(i32),
    PlayerConnected,
    LeaderboardReady(Leaderboard),
    ReportFailed(String),
}

impl GameEvent {
    /// Event name used when forwarding to the frontend
    pub fn name(&self) -> &'static str {
        match self {
            GameEvent::DirectionChanged(_) => "direction-changed",
            GameEvent::GameOver { .. } => "game-over",
            GameEvent::ScoreUpdated(_) => "score-updated",
            GameEvent::PlayerConnected => "player-connected",
            GameEvent::LeaderboardReady(_) => "leaderboard-ready",
            GameEvent::ReportFailed(_) => "report-failed",
        }
    }
}

/// Handle returned by `EventBus::subscribe`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&GameEvent) + Send>;

/// Fan-out of game events to registered listeners
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&GameEvent) + Send + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false if the subscription was already gone
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub, _)| *sub != id);
        self.listeners.len() != before
    }

    pub fn publish(&mut self, event: &GameEvent) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn publish_reaches_subscribers_until_unsubscribed() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::new();

        let sink = Arc::clone(&seen);
        let id = bus.subscribe(move |e| sink.lock().unwrap().push(e.clone()));

        bus.publish(&GameEvent::ScoreUpdated(3));
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.publish(&GameEvent::ScoreUpdated(4));

        assert_eq!(*seen.lock().unwrap(), vec![GameEvent::ScoreUpdated(3)]);
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn events_serialize_with_tag() {
        let json = serde_json::to_value(GameEvent::GameOver {
            score: 12,
            reason: GameOverReason::HitObstacle,
        })
        .unwrap();
        assert_eq!(json["event"], "game_over");
        assert_eq!(json["payload"]["score"], 12);
        assert_eq!(json["payload"]["reason"], "hit_obstacle");
    }
}
