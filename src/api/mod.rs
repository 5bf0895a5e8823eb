//! Platform API modules: score persistence and session bootstrap

pub mod client;
pub mod score;
pub mod session;

pub use client::{ApiClient, ApiConfig, ApiError};
pub use score::{GameKind, GameStats, ModeStats, ScoreAck, ScoreClient};
pub use session::{SessionApi, SessionTicket};
