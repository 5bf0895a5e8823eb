//! Remote round controller.
//!
//! Owns the duplex session for a gesture round: bootstraps a session
//! handle over REST, opens the stream, pumps camera frames out at the
//! transmit cadence, and mirrors authoritative snapshots and frame
//! telemetry back in. The browser analogue computed nothing; neither
//! does this.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

use crate::api::{ApiError, GameKind, ScoreClient, SessionApi};
use crate::command::Command;
use crate::game::{GameState, RemoteProxy, SimulationSource};
use crate::render::{render, DrawCmd, Hud};
use crate::util::time::{unix_millis, FRAME_INTERVAL_MS};
use crate::ws::protocol::{ClientMsg, ServerMsg};

use super::capture::{CaptureState, FrameSource};

/// How long `stop` waits for each task to drain before aborting it
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

/// How long an authoritative gesture stays up as the last command
const GESTURE_INDICATOR_MS: u64 = 800;

/// Faults that prevent a remote round from starting
#[derive(Debug, Error)]
pub enum SessionError {
    /// Fatal to the gesture modality; no network traffic is attempted
    #[error("camera permission denied")]
    CameraDenied,

    #[error("session bootstrap failed: {0}")]
    Bootstrap(#[from] ApiError),

    #[error("failed to open session stream: {0}")]
    Connect(#[from] tokio_tungstenite::tungstenite::Error),
}

/// Live feedback mirrored from the service. Hand presence comes only
/// from processed-frame messages, never from state pushes.
#[derive(Debug, Clone, Default)]
pub struct Telemetry {
    pub connected: bool,
    pub hand_detected: bool,
    pub description: String,
    /// Most recent zone, from either message channel
    pub gesture: Command,
    /// Wall clock of the last authoritative motion gesture
    pub gesture_seen_ms: u64,
    /// Last processed frame echoed by the service, for the preview
    pub processed_frame: Option<String>,
    pub high_score: u32,
    pub new_high_score: bool,
    /// Transport fault, surfaced until the user retries
    pub last_error: Option<String>,
}

/// A live remote round. [`stop`] tears it down gracefully; dropping
/// it instead aborts the tasks and releases the capture device, so
/// nothing outlives the controller either way.
///
/// [`stop`]: RemoteSession::stop
pub struct RemoteSession {
    source: Arc<Mutex<SimulationSource>>,
    telemetry: Arc<Mutex<Telemetry>>,
    capture: Arc<dyn FrameSource>,
    scores: ScoreClient,
    frames_enabled: Arc<AtomicBool>,
    outbound: Option<mpsc::Sender<ClientMsg>>,
    shutdown: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl std::fmt::Debug for RemoteSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteSession").finish_non_exhaustive()
    }
}

impl RemoteSession {
    /// Bootstrap a session and open its stream. The capture device
    /// must already be acquired; a denied camera fails here, before
    /// any network traffic.
    pub async fn begin(
        api: SessionApi,
        scores: ScoreClient,
        capture: Arc<dyn FrameSource>,
    ) -> Result<Self, SessionError> {
        if capture.state() == CaptureState::Denied {
            return Err(SessionError::CameraDenied);
        }

        let ticket = api.create_session().await?;
        let endpoint = api.websocket_endpoint(&ticket);
        info!(session_id = %ticket.session_id, "opening gesture session stream");
        let (socket, _) = connect_async(endpoint.as_str()).await?;
        let (mut sink, mut stream) = socket.split();

        let source = Arc::new(Mutex::new(SimulationSource::Remote(RemoteProxy::new())));
        let telemetry = Arc::new(Mutex::new(Telemetry {
            connected: true,
            ..Telemetry::default()
        }));
        let frames_enabled = Arc::new(AtomicBool::new(true));
        let (outbound_tx, mut outbound_rx) = mpsc::channel::<ClientMsg>(64);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        // Writer task: client messages -> socket. On shutdown it
        // drains what is already queued, so a final stop_camera still
        // reaches the service, then closes the socket.
        let writer = {
            let mut shutdown = shutdown_rx.clone();
            tokio::spawn(async move {
                loop {
                    tokio::select! {
                        next = outbound_rx.recv() => {
                            let Some(msg) = next else { break };
                            if write_msg(&mut sink, &msg).await.is_err() {
                                break;
                            }
                        }
                        _ = shutdown.changed() => {
                            while let Ok(msg) = outbound_rx.try_recv() {
                                if write_msg(&mut sink, &msg).await.is_err() {
                                    break;
                                }
                            }
                            break;
                        }
                    }
                }
                let _ = sink.close().await;
            })
        };

        // The round-start message is queued before the pump task
        // exists, so no frame can precede it on the wire.
        outbound_tx.send(ClientMsg::Start).await.map_err(|_| {
            SessionError::Connect(tokio_tungstenite::tungstenite::Error::ConnectionClosed)
        })?;

        // Frame pump: one encoded frame per cadence tick, gated on
        // capture readiness so we never outrun the device, and on the
        // enable flag so no frame chases a finished round.
        let pump = {
            let outbound = outbound_tx.clone();
            let capture = capture.clone();
            let enabled = frames_enabled.clone();
            let mut shutdown = shutdown_rx;
            tokio::spawn(async move {
                let mut cadence = interval(Duration::from_millis(FRAME_INTERVAL_MS));
                cadence.set_missed_tick_behavior(MissedTickBehavior::Skip);
                loop {
                    tokio::select! {
                        _ = cadence.tick() => {
                            if !enabled.load(Ordering::Relaxed) {
                                continue;
                            }
                            if capture.state() != CaptureState::Ready {
                                continue;
                            }
                            let Some(frame) = capture.poll_frame() else {
                                continue;
                            };
                            if outbound.send(ClientMsg::Frame { frame }).await.is_err() {
                                break;
                            }
                        }
                        _ = shutdown.changed() => break,
                    }
                }
            })
        };

        // Reader task: socket -> state mirror and telemetry. The
        // terminal edge, which the proxy reports at most once per
        // round, submits the score and then closes the session; a new
        // round means a new session.
        let reader = {
            let source = source.clone();
            let telemetry = telemetry.clone();
            let frames_enabled = frames_enabled.clone();
            let scores = scores.clone();
            let capture = capture.clone();
            let shutdown = shutdown_tx.clone();
            tokio::spawn(async move {
                while let Some(next) = stream.next().await {
                    let msg = match next {
                        Ok(Message::Text(text)) => {
                            match serde_json::from_str::<ServerMsg>(&text) {
                                Ok(msg) => msg,
                                Err(e) => {
                                    warn!(error = %e, "unparseable server message");
                                    continue;
                                }
                            }
                        }
                        Ok(Message::Close(_)) => break,
                        Ok(_) => continue,
                        Err(e) => {
                            telemetry.lock().last_error = Some(e.to_string());
                            break;
                        }
                    };

                    match msg {
                        ServerMsg::GameStarted { state }
                        | ServerMsg::GameRestarted { state } => {
                            if let SimulationSource::Remote(proxy) = &mut *source.lock() {
                                proxy.replace(state);
                            }
                        }
                        ServerMsg::GameState { state, gesture } => {
                            {
                                let mut t = telemetry.lock();
                                t.gesture = gesture;
                                if gesture.is_motion() {
                                    t.gesture_seen_ms = unix_millis();
                                }
                            }
                            let ended = match &mut *source.lock() {
                                SimulationSource::Remote(proxy) => proxy.replace(state),
                                SimulationSource::Local(_) => false,
                            };
                            if ended {
                                frames_enabled.store(false, Ordering::Relaxed);
                                let score = source.lock().current_state().score;
                                info!(score, "remote round over");
                                match scores.submit(GameKind::Gesture, score).await {
                                    Ok(ack) => {
                                        let mut t = telemetry.lock();
                                        t.high_score = ack.high_score;
                                        t.new_high_score = ack.is_high_score;
                                    }
                                    Err(e) => warn!(
                                        error = %e,
                                        "score submission failed, keeping last known high score"
                                    ),
                                }
                                // The session ends with the round:
                                // close the channel and stop capture.
                                let _ = shutdown.send(true);
                                capture.release();
                                break;
                            }
                        }
                        ServerMsg::VideoFrame {
                            frame,
                            hand_detected,
                            description,
                            gesture,
                        } => {
                            let mut t = telemetry.lock();
                            t.hand_detected = hand_detected;
                            t.description = description;
                            t.gesture = gesture;
                            t.processed_frame = Some(frame);
                        }
                        ServerMsg::CameraStopped => {
                            debug!("service stopped consuming frames");
                        }
                    }
                }

                // Transport is gone: no frame may chase a dead channel
                frames_enabled.store(false, Ordering::Relaxed);
                telemetry.lock().connected = false;
            })
        };

        let session = Self {
            source,
            telemetry,
            capture,
            scores,
            frames_enabled,
            outbound: Some(outbound_tx),
            shutdown: shutdown_tx,
            tasks: vec![writer, pump, reader],
        };
        session.refresh_high_score().await;
        Ok(session)
    }

    /// Latest mirrored snapshot.
    pub fn state(&self) -> GameState {
        self.source.lock().current_state().clone()
    }

    pub fn telemetry(&self) -> Telemetry {
        self.telemetry.lock().clone()
    }

    /// Seed the high-score display before the first submission.
    pub async fn refresh_high_score(&self) {
        match self.scores.high_score(GameKind::Gesture).await {
            Ok(high_score) => self.telemetry.lock().high_score = high_score,
            Err(e) => warn!(error = %e, "high score fetch failed"),
        }
    }

    /// Build the scene for the current mirror and telemetry.
    /// `now_ms` is unix wall-clock time, the clock the telemetry's
    /// indicator timestamps run on.
    pub fn scene(&self, now_ms: u64) -> Vec<DrawCmd> {
        let telemetry = self.telemetry.lock();
        let indicator_live = telemetry.gesture.is_motion()
            && now_ms.saturating_sub(telemetry.gesture_seen_ms) < GESTURE_INDICATOR_MS;
        let hud = Hud {
            high_score: telemetry.high_score,
            new_high_score: telemetry.new_high_score,
            last_command: indicator_live.then(|| telemetry.gesture.label().to_string()),
            ready: telemetry.connected && self.capture.state() == CaptureState::Ready,
            error: telemetry.last_error.clone(),
        };
        drop(telemetry);
        render(&self.state(), &hud, now_ms)
    }

    /// Tear the session down: stop frames, tell the service the
    /// camera is closing, drain the writer, release the device.
    /// Idempotent.
    pub async fn stop(&mut self) {
        self.frames_enabled.store(false, Ordering::Relaxed);
        let Some(outbound) = self.outbound.take() else {
            return;
        };
        outbound.send(ClientMsg::StopCamera).await.ok();
        let _ = self.shutdown.send(true);
        drop(outbound);

        for mut task in self.tasks.drain(..) {
            if tokio::time::timeout(SHUTDOWN_GRACE, &mut task).await.is_err() {
                task.abort();
            }
        }

        self.capture.release();
        self.telemetry.lock().connected = false;
        info!("gesture session stopped");
    }
}

async fn write_msg<S>(sink: &mut S, msg: &ClientMsg) -> Result<(), ()>
where
    S: futures::Sink<Message> + Unpin,
{
    let json = match serde_json::to_string(msg) {
        Ok(json) => json,
        Err(e) => {
            warn!(error = %e, "unserializable client message");
            return Ok(());
        }
    };
    sink.send(Message::Text(json)).await.map_err(|_| ())
}

impl Drop for RemoteSession {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
        self.capture.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiClient, ApiConfig};
    use crate::session::capture::StaticCamera;

    struct DeniedCamera;

    impl FrameSource for DeniedCamera {
        fn state(&self) -> CaptureState {
            CaptureState::Denied
        }

        fn poll_frame(&self) -> Option<String> {
            None
        }

        fn release(&self) {}
    }

    fn clients(base_url: &str, token: Option<&str>) -> (SessionApi, ScoreClient) {
        let api = ApiClient::new(ApiConfig {
            base_url: base_url.to_string(),
            auth_token: token.map(String::from),
        });
        (SessionApi::new(api.clone()), ScoreClient::new(api))
    }

    /// A session with no live tasks, for exercising the scene logic.
    fn idle_session() -> RemoteSession {
        let (_, scores) = clients("http://127.0.0.1:9", None);
        let (shutdown, _) = watch::channel(false);
        RemoteSession {
            source: Arc::new(Mutex::new(SimulationSource::Remote(RemoteProxy::new()))),
            telemetry: Arc::new(Mutex::new(Telemetry::default())),
            capture: Arc::new(StaticCamera::new(
                "data:image/jpeg;base64,AAAA".to_string(),
            )),
            scores,
            frames_enabled: Arc::new(AtomicBool::new(false)),
            outbound: None,
            shutdown,
            tasks: Vec::new(),
        }
    }

    #[test]
    fn gesture_indicator_expires_after_its_window() {
        let session = idle_session();
        if let SimulationSource::Remote(proxy) = &mut *session.source.lock() {
            proxy.replace(GameState {
                game_started: true,
                ..GameState::default()
            });
        }
        {
            let mut t = session.telemetry.lock();
            t.gesture = Command::Up;
            t.gesture_seen_ms = 10_000;
        }

        let shows_up = |scene: &[DrawCmd]| {
            scene.iter().any(|cmd| matches!(
                cmd,
                DrawCmd::Text { text, .. } if text == "UP"
            ))
        };

        // Live inside the window, gone the instant it closes
        assert!(shows_up(&session.scene(10_000)));
        assert!(shows_up(&session.scene(10_000 + GESTURE_INDICATOR_MS - 1)));
        assert!(!shows_up(&session.scene(10_000 + GESTURE_INDICATOR_MS)));

        // A centered hand never shows as a command at all
        session.telemetry.lock().gesture = Command::None;
        assert!(!shows_up(&session.scene(10_000)));
    }

    #[tokio::test]
    async fn denied_camera_fails_before_any_network_traffic() {
        // Unroutable base: reaching it would error as Bootstrap, so a
        // CameraDenied result proves nothing was attempted.
        let (api, scores) = clients("http://127.0.0.1:9", Some("token"));
        let err = RemoteSession::begin(api, scores, Arc::new(DeniedCamera))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::CameraDenied));
    }

    #[tokio::test]
    async fn missing_credential_fails_bootstrap_without_a_request() {
        let camera = Arc::new(super::super::capture::StaticCamera::new(
            "data:image/jpeg;base64,AAAA".to_string(),
        ));
        let (api, scores) = clients("http://127.0.0.1:9", None);
        let err = RemoteSession::begin(api, scores, camera)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::Bootstrap(ApiError::MissingCredential)
        ));
    }
}
