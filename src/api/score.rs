//! Score submission and per-mode lifetime statistics

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::client::{ApiClient, ApiError};

/// Which game mode a score belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    Voice,
    Gesture,
}

impl GameKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Voice => "voice",
            Self::Gesture => "gesture",
        }
    }
}

/// Score submission payload
#[derive(Debug, Clone, Serialize)]
pub struct ScoreSubmission {
    pub game_type: GameKind,
    pub score: u32,
}

/// Acknowledgement returned for a submitted score
#[derive(Debug, Clone, Deserialize)]
pub struct ScoreAck {
    pub success: bool,
    pub is_high_score: bool,
    pub high_score: u32,
    pub total_games: u32,
    pub average_score: f64,
}

/// Lifetime statistics for one game mode
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModeStats {
    pub high_score: u32,
    pub total_games: u32,
    pub average_score: f64,
    #[serde(default)]
    pub last_played: Option<DateTime<Utc>>,
}

/// Statistics for both modes
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GameStats {
    pub voice: ModeStats,
    pub gesture: ModeStats,
}

#[derive(Debug, Deserialize)]
struct StatsEnvelope {
    stats: GameStats,
}

/// Score API operations
#[derive(Clone)]
pub struct ScoreClient {
    client: ApiClient,
}

impl ScoreClient {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Submit a finished round's score.
    pub async fn submit(&self, kind: GameKind, score: u32) -> Result<ScoreAck, ApiError> {
        debug!(mode = kind.as_str(), score, "submitting round score");
        let submission = ScoreSubmission {
            game_type: kind,
            score,
        };
        self.client.post("/games/score", &submission).await
    }

    /// Fetch lifetime statistics for both modes.
    pub async fn stats(&self) -> Result<GameStats, ApiError> {
        let envelope: StatsEnvelope = self.client.get("/games/stats").await?;
        Ok(envelope.stats)
    }

    /// Fetch the stored high score for one mode.
    pub async fn high_score(&self, kind: GameKind) -> Result<u32, ApiError> {
        let stats = self.stats().await?;
        Ok(match kind {
            GameKind::Voice => stats.voice.high_score,
            GameKind::Gesture => stats.gesture.high_score,
        })
    }
}
