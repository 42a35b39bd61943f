//! HTTP - Remote leaderboard over the guest-session REST API
//!
//! Uses ureq for blocking requests; `ScoreReporter` keeps them off the
//! game thread.

use std::sync::Mutex;
use std::time::Duration;

use serde::Deserialize;
use serde_json::json;

use super::{
    LeaderboardBackend, LeaderboardConfig, LeaderboardEntry, LeaderboardError, PlayerRef, Session,
};

const SESSION_HEADER: &str = "x-session-token";

#[derive(Debug, Clone)]
struct ActiveSession {
    token: String,
    session: Session,
}

/// Remote leaderboard client
#[derive(Debug)]
pub struct HttpLeaderboard {
    agent: ureq::Agent,
    base_url: String,
    game_key: String,
    game_version: String,
    session: Mutex<Option<ActiveSession>>,
}

// Response format: {"success": true, "session_token": "...", "player_id": N, "player_identifier": "..."}
#[derive(Debug, Deserialize)]
struct GuestSessionResponse {
    #[serde(default)]
    success: bool,
    session_token: String,
    player_id: u64,
    #[serde(default)]
    player_identifier: String,
}

#[derive(Debug, Deserialize)]
struct ScoreListResponse {
    #[serde(default)]
    items: Vec<ScoreListItem>,
}

#[derive(Debug, Deserialize)]
struct ScoreListItem {
    rank: u32,
    score: i32,
    #[serde(default)]
    player: Option<ScoreListPlayer>,
}

#[derive(Debug, Deserialize)]
struct ScoreListPlayer {
    id: u64,
    #[serde(default)]
    name: Option<String>,
}

impl From<ScoreListItem> for LeaderboardEntry {
    fn from(item: ScoreListItem) -> Self {
        Self {
            rank: item.rank,
            score: item.score,
            player: item.player.map(|p| PlayerRef {
                id: p.id,
                name: p.name.unwrap_or_default(),
            }),
        }
    }
}

impl HttpLeaderboard {
    pub fn new(config: &LeaderboardConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build();

        Self {
            agent,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            game_key: config.game_key.clone(),
            game_version: config.game_version.clone(),
            session: Mutex::new(None),
        }
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    fn token(&self) -> Result<String, LeaderboardError> {
        let session = self
            .session
            .lock()
            .map_err(|e| LeaderboardError::Other(e.to_string()))?;
        session
            .as_ref()
            .map(|s| s.token.clone())
            .ok_or(LeaderboardError::NoSession)
    }

    fn known_identifier(&self) -> Option<String> {
        self.session
            .lock()
            .ok()?
            .as_ref()
            .map(|s| s.session.player_identifier.clone())
    }

    fn convert_error(e: ureq::Error) -> LeaderboardError {
        match e {
            ureq::Error::Status(code, response) => LeaderboardError::Status {
                code,
                body: response.into_string().unwrap_or_default(),
            },
            ureq::Error::Transport(transport) => LeaderboardError::Network(transport.to_string()),
        }
    }

    fn decode<T: serde::de::DeserializeOwned>(response: ureq::Response) -> Result<T, LeaderboardError> {
        response
            .into_json()
            .map_err(|e| LeaderboardError::Decode(e.to_string()))
    }
}

impl LeaderboardBackend for HttpLeaderboard {
    fn start_guest_session(&self) -> Result<Session, LeaderboardError> {
        let mut body = json!({
            "game_key": self.game_key,
            "game_version": self.game_version,
        });
        // Reuse the same guest player across reconnects
        if let Some(identifier) = self.known_identifier() {
            body["player_identifier"] = json!(identifier);
        }

        let response = self
            .agent
            .post(&self.url("/game/v2/session/guest"))
            .set("Content-Type", "application/json")
            .send_json(body)
            .map_err(Self::convert_error)?;
        let parsed: GuestSessionResponse = Self::decode(response)?;

        if !parsed.success {
            return Err(LeaderboardError::Rejected("guest session refused".to_string()));
        }

        let session = Session {
            player_id: parsed.player_id,
            player_identifier: parsed.player_identifier,
        };
        let mut slot = self
            .session
            .lock()
            .map_err(|e| LeaderboardError::Other(e.to_string()))?;
        *slot = Some(ActiveSession {
            token: parsed.session_token,
            session: session.clone(),
        });

        Ok(session)
    }

    fn set_player_name(&self, name: &str) -> Result<(), LeaderboardError> {
        let token = self.token()?;
        self.agent
            .request("PATCH", &self.url("/game/player/name"))
            .set(SESSION_HEADER, &token)
            .send_json(json!({ "name": name }))
            .map_err(Self::convert_error)?;
        Ok(())
    }

    fn submit_score(&self, member_id: &str, score: i32, leaderboard: &str) -> Result<(), LeaderboardError> {
        let token = self.token()?;
        let url = self.url(&format!("/game/leaderboards/{}/submit", leaderboard));
        self.agent
            .post(&url)
            .set(SESSION_HEADER, &token)
            .send_json(json!({
                "member_id": member_id,
                "score": score,
                "metadata": "",
            }))
            .map_err(Self::convert_error)?;
        Ok(())
    }

    fn get_score_list(&self, leaderboard: &str, count: u32) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        let token = self.token()?;
        let url = self.url(&format!("/game/leaderboards/{}/list", leaderboard));
        let response = self
            .agent
            .get(&url)
            .set(SESSION_HEADER, &token)
            .query("count", &count.to_string())
            .call()
            .map_err(Self::convert_error)?;

        let parsed: ScoreListResponse = Self::decode(response)?;
        Ok(parsed.items.into_iter().map(LeaderboardEntry::from).collect())
    }
}
