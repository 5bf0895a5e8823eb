//! Voice round controller.
//!
//! Owns a locally-authoritative round end to end: the engine, the
//! speech intake and the score client. Single-threaded cooperative
//! driving: the embedder calls `tick` once per animation frame and
//! routes recognizer events through `handle_speech`.

use tracing::{info, warn};

use crate::api::{GameKind, ScoreClient};
use crate::command::{SpeechEvent, SpeechFault, SpeechIntake, SpeechOutcome};
use crate::game::{EngineConfig, GameState, LocalEngine, SimulationSource, TickEvent};
use crate::render::{render, DrawCmd, Hud};

pub struct VoiceSession {
    source: SimulationSource,
    intake: SpeechIntake,
    scores: ScoreClient,
    high_score: u32,
    new_high_score: bool,
    /// Set once the microphone is refused; voice input stays down
    fatal: Option<SpeechFault>,
    submitted: bool,
}

impl VoiceSession {
    pub fn new(scores: ScoreClient) -> Self {
        Self::with_config(EngineConfig::default(), rand::random(), scores)
    }

    pub fn with_config(config: EngineConfig, seed: u64, scores: ScoreClient) -> Self {
        Self {
            source: SimulationSource::Local(LocalEngine::with_config(config, seed)),
            intake: SpeechIntake::new(),
            scores,
            high_score: 0,
            new_high_score: false,
            fatal: None,
            submitted: false,
        }
    }

    pub fn state(&self) -> &GameState {
        self.source.current_state()
    }

    /// Seed the high-score display before the first submission. A
    /// failed fetch keeps the last known value.
    pub async fn refresh_high_score(&mut self) {
        match self.scores.high_score(GameKind::Voice).await {
            Ok(high_score) => self.high_score = high_score,
            Err(e) => warn!(error = %e, "high score fetch failed"),
        }
    }

    /// Begin a fresh round. A microphone refusal from an earlier
    /// round persists; the modality stays unavailable.
    pub fn start(&mut self, now_ms: u64) {
        self.intake.reset();
        self.new_high_score = false;
        self.submitted = false;
        self.source.start(now_ms);
    }

    /// Route one recognizer event. Accepted commands apply to the
    /// engine immediately; the outcome is returned so the embedder
    /// can restart its recognizer when asked to.
    pub fn handle_speech(&mut self, event: SpeechEvent, now_ms: u64) -> SpeechOutcome {
        if self.fatal.is_some() {
            return SpeechOutcome::Ignored;
        }

        let round_active = self.source.current_state().is_active();
        let outcome = self.intake.handle(event, now_ms, round_active);
        match &outcome {
            SpeechOutcome::Commands(commands) => {
                for command in commands {
                    self.source.dispatch(*command);
                }
            }
            SpeechOutcome::Fatal(fault) => {
                warn!(error = %fault, "voice input unavailable");
                self.fatal = Some(fault.clone());
                self.source.stop();
            }
            SpeechOutcome::Restart | SpeechOutcome::Ignored => {}
        }
        outcome
    }

    /// Advance the round one tick. The crash tick submits the final
    /// score; a failed submission still leaves the round over and the
    /// high-score display on its last known value.
    pub async fn tick(&mut self, now_ms: u64) -> Vec<TickEvent> {
        let events = self.source.tick(now_ms);
        for event in &events {
            if let TickEvent::Crashed { score, .. } = event {
                self.submit(*score).await;
            }
        }
        events
    }

    async fn submit(&mut self, score: u32) {
        if self.submitted {
            return;
        }
        self.submitted = true;

        match self.scores.submit(GameKind::Voice, score).await {
            Ok(ack) => {
                info!(score, high_score = ack.high_score, "round score submitted");
                self.high_score = ack.high_score;
                self.new_high_score = ack.is_high_score;
            }
            Err(e) => {
                warn!(error = %e, "score submission failed, keeping last known high score");
            }
        }
    }

    /// Build the scene for the current state.
    pub fn scene(&self, now_ms: u64) -> Vec<DrawCmd> {
        let hud = Hud {
            high_score: self.high_score,
            new_high_score: self.new_high_score,
            last_command: self.intake.indicator(now_ms).map(String::from),
            // Voice needs no pre-acquired device; ready unless the
            // microphone was refused
            ready: self.fatal.is_none(),
            error: self.fatal.as_ref().map(|fault| fault.to_string()),
        };
        render(self.source.current_state(), &hud, now_ms)
    }
}
