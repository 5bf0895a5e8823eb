//! Shared test fixtures: a stub platform API (session bootstrap,
//! score persistence, stats) and client builders against it.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::{engine::general_purpose::STANDARD, Engine};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use uuid::Uuid;

use sky_racer::api::{ApiClient, ApiConfig, ScoreClient, SessionApi};

/// In-memory stand-in for the platform API
#[derive(Default)]
pub struct Platform {
    /// Every accepted submission, as (game_type, score)
    pub submissions: Mutex<Vec<(String, u32)>>,
    pub high: AtomicU32,
}

pub fn platform_router(platform: Arc<Platform>) -> Router {
    Router::new()
        .route("/games/gesture/session", post(create_session))
        .route("/games/score", post(submit_score))
        .route("/games/stats", get(stats))
        .with_state(platform)
}

async fn create_session() -> Json<Value> {
    let id = Uuid::new_v4();
    Json(json!({
        "session_id": id,
        "websocket_url": format!("/ws/gesture/{id}"),
    }))
}

async fn submit_score(
    State(platform): State<Arc<Platform>>,
    Json(body): Json<Value>,
) -> Json<Value> {
    let kind = body["game_type"].as_str().unwrap_or_default().to_string();
    let score = body["score"].as_u64().unwrap_or(0) as u32;

    let previous = platform.high.load(Ordering::SeqCst);
    let is_high = score > previous;
    if is_high {
        platform.high.store(score, Ordering::SeqCst);
    }
    let mut submissions = platform.submissions.lock();
    submissions.push((kind, score));
    Json(json!({
        "success": true,
        "is_high_score": is_high,
        "high_score": platform.high.load(Ordering::SeqCst),
        "total_games": submissions.len(),
        "average_score": score as f64,
    }))
}

async fn stats(State(platform): State<Arc<Platform>>) -> Json<Value> {
    let mode = json!({
        "high_score": platform.high.load(Ordering::SeqCst),
        "total_games": platform.submissions.lock().len(),
        "average_score": 0.0,
        "last_played": null,
    });
    Json(json!({ "stats": { "voice": mode.clone(), "gesture": mode } }))
}

/// Serve the stub platform on an ephemeral port.
pub async fn spawn_platform() -> (SocketAddr, Arc<Platform>) {
    let platform = Arc::new(Platform::default());
    let router = platform_router(platform.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (addr, platform)
}

pub fn clients(addr: SocketAddr) -> (SessionApi, ScoreClient) {
    let api = ApiClient::new(ApiConfig {
        base_url: format!("http://{addr}"),
        auth_token: Some("test-token".to_string()),
    });
    (SessionApi::new(api.clone()), ScoreClient::new(api))
}

/// A well-formed camera frame payload.
pub fn test_frame() -> String {
    format!("data:image/jpeg;base64,{}", STANDARD.encode(b"jpegbytes"))
}
