//! WebSocket upgrade handler and the per-session simulation actor

use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::interval;
use tracing::{debug, error, info, warn};

use crate::app::AppState;
use crate::command::Command;
use crate::game::{LocalEngine, TickEvent};
use crate::util::rate_limit::SessionRateLimiter;
use crate::util::time::{unix_millis, TICK_DURATION_MICROS};
use crate::vision::{classify_zone, decode_frame_payload, describe, HandTracker};
use crate::ws::protocol::{ClientMsg, ServerMsg};

/// WebSocket upgrade handler for `/ws/gesture/{session_id}`
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(session_id): Path<String>,
    State(state): State<AppState>,
) -> Response {
    info!(session_id = %session_id, "WebSocket upgrade for gesture session");
    ws.on_upgrade(move |socket| handle_socket(socket, session_id, state))
}

/// Handle the upgraded WebSocket connection
async fn handle_socket(socket: WebSocket, session_id: String, state: AppState) {
    let connection_id = state.sessions.register(session_id.clone());
    info!(session_id = %session_id, connection = %connection_id, "new gesture session");

    let (mut ws_sink, mut ws_stream) = socket.split();

    let (outbound_tx, mut outbound_rx) = mpsc::channel::<ServerMsg>(64);
    let (inbound_tx, inbound_rx) = mpsc::channel::<ClientMsg>(256);

    // Writer task: actor messages -> WebSocket
    let writer_session_id = session_id.clone();
    let writer_handle = tokio::spawn(async move {
        while let Some(msg) = outbound_rx.recv().await {
            if let Err(e) = send_msg(&mut ws_sink, &msg).await {
                debug!(session_id = %writer_session_id, error = %e, "WebSocket send failed");
                break;
            }
        }
    });

    // Reader task: WebSocket -> actor, with frame rate limiting
    let reader_session_id = session_id.clone();
    let reader_handle = tokio::spawn(async move {
        let rate_limiter = SessionRateLimiter::new();

        while let Some(result) = ws_stream.next().await {
            match result {
                Ok(Message::Text(text)) => match serde_json::from_str::<ClientMsg>(&text) {
                    Ok(msg) => {
                        if matches!(msg, ClientMsg::Frame { .. }) && !rate_limiter.check_frame() {
                            debug!(session_id = %reader_session_id, "frame rate limited");
                            continue;
                        }
                        if inbound_tx.send(msg).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(session_id = %reader_session_id, error = %e, "failed to parse client message");
                    }
                },
                Ok(Message::Binary(_)) => {
                    warn!(session_id = %reader_session_id, "received binary message, ignoring");
                }
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
                Ok(Message::Close(_)) => {
                    info!(session_id = %reader_session_id, "client initiated close");
                    break;
                }
                Err(e) => {
                    error!(session_id = %reader_session_id, error = %e, "WebSocket error");
                    break;
                }
            }
        }
    });

    let session = GestureSession {
        session_id: session_id.clone(),
        engine: LocalEngine::with_config(state.engine_config, rand::random()),
        tracker: (state.trackers)(),
        last_gesture: Command::None,
        outbound: outbound_tx,
    };
    session.run(inbound_rx).await;

    writer_handle.abort();
    reader_handle.abort();
    state.sessions.remove(&session_id);
    info!(session_id = %session_id, "gesture session closed");
}

/// The per-connection simulation actor. Owns the authoritative engine
/// and the hand tracker; nothing else touches them.
struct GestureSession {
    session_id: String,
    engine: LocalEngine,
    tracker: Box<dyn HandTracker>,
    /// Most recent zone the round acted on, echoed with state pushes
    last_gesture: Command,
    outbound: mpsc::Sender<ServerMsg>,
}

impl GestureSession {
    /// Drive the session: drain client messages, then advance the
    /// round and push the authoritative state, at the simulation rate.
    async fn run(mut self, mut inbound_rx: mpsc::Receiver<ClientMsg>) {
        let mut tick_interval = interval(Duration::from_micros(TICK_DURATION_MICROS));
        tick_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tick_interval.tick().await;

            loop {
                match inbound_rx.try_recv() {
                    Ok(msg) => {
                        if !self.handle_message(msg).await {
                            return;
                        }
                    }
                    Err(mpsc::error::TryRecvError::Empty) => break,
                    Err(mpsc::error::TryRecvError::Disconnected) => {
                        debug!(session_id = %self.session_id, "client message channel closed");
                        return;
                    }
                }
            }

            if !self.advance().await {
                return;
            }
        }
    }

    /// Returns false once the writer side is gone.
    async fn handle_message(&mut self, msg: ClientMsg) -> bool {
        match msg {
            ClientMsg::Start => {
                self.engine.start(unix_millis());
                self.last_gesture = Command::None;
                info!(session_id = %self.session_id, "round started");
                self.send(ServerMsg::GameStarted {
                    state: self.engine.state().clone(),
                })
                .await
            }
            ClientMsg::Restart => {
                self.engine.start(unix_millis());
                self.last_gesture = Command::None;
                info!(session_id = %self.session_id, "round restarted");
                self.send(ServerMsg::GameRestarted {
                    state: self.engine.state().clone(),
                })
                .await
            }
            ClientMsg::Frame { frame } => self.handle_frame(frame).await,
            ClientMsg::StopCamera => {
                debug!(session_id = %self.session_id, "camera stopped");
                self.send(ServerMsg::CameraStopped).await
            }
        }
    }

    /// Decode one camera frame, classify the palm zone, steer the
    /// round if one is running, and echo the frame back.
    async fn handle_frame(&mut self, frame: String) -> bool {
        let bytes = match decode_frame_payload(&frame) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(session_id = %self.session_id, error = %e, "dropping undecodable frame");
                return true;
            }
        };

        let point = self.tracker.locate(&bytes);
        let gesture = match point {
            Some(p) => classify_zone(p),
            None => Command::None,
        };
        let description = describe(gesture, point);

        // Zones re-apply every frame while held, so a hand parked at
        // the edge keeps the airplane moving.
        if self.engine.is_active() {
            if gesture.is_motion() {
                self.engine.dispatch(gesture);
                self.last_gesture = gesture;
            } else {
                self.last_gesture = Command::None;
            }
        }

        self.send(ServerMsg::VideoFrame {
            frame,
            hand_detected: point.is_some(),
            description,
            gesture,
        })
        .await
    }

    /// Advance a running round one tick and push the resulting state.
    /// The terminal tick still pushes, so the client sees game over.
    async fn advance(&mut self) -> bool {
        if !self.engine.is_active() {
            return true;
        }

        let events = self.engine.tick(unix_millis());
        for event in &events {
            if let TickEvent::Crashed { score, .. } = event {
                info!(session_id = %self.session_id, score, "round over");
            }
        }

        self.send(ServerMsg::GameState {
            state: self.engine.state().clone(),
            gesture: self.last_gesture,
        })
        .await
    }

    async fn send(&self, msg: ServerMsg) -> bool {
        if self.outbound.send(msg).await.is_err() {
            debug!(session_id = %self.session_id, "outbound channel closed");
            return false;
        }
        true
    }
}

/// Send a message over WebSocket
async fn send_msg(
    sink: &mut futures::stream::SplitSink<WebSocket, Message>,
    msg: &ServerMsg,
) -> Result<(), String> {
    let json = serde_json::to_string(msg).map_err(|e| e.to_string())?;
    sink.send(Message::Text(json))
        .await
        .map_err(|e| e.to_string())
}
