//! Speech intake: recognizer events in, movement commands out

use thiserror::Error;
use tracing::{debug, warn};

use super::{commands_in_transcript, Command};

/// Identical transcripts arriving inside this window are coalesced
pub const DEDUPE_WINDOW_MS: u64 = 500;
/// How long an accepted transcript stays visible as the last command
pub const INDICATOR_MS: u64 = 1000;

/// Faults reported by a speech recognizer backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpeechFault {
    /// Microphone permission refused; voice input cannot run
    #[error("microphone permission denied")]
    PermissionDenied,
    /// Recognizer heard nothing usable
    #[error("no speech detected")]
    NoSpeech,
    /// Any other recognizer-reported error
    #[error("recognizer error: {0}")]
    Other(String),
}

/// Events from a speech recognizer backend
#[derive(Debug, Clone)]
pub enum SpeechEvent {
    /// A recognition result, interim or final
    Transcript { text: String, is_final: bool },
    /// The recognizer reported a fault
    Fault(SpeechFault),
    /// The recognition session ended on its own
    Ended,
}

/// What the intake decided to do with one event
#[derive(Debug, Clone, PartialEq)]
pub enum SpeechOutcome {
    /// Commands to dispatch, in keyword scan order
    Commands(Vec<Command>),
    /// Recognition should be restarted to keep listening
    Restart,
    /// Fatal fault; voice input is unavailable for this session
    Fatal(SpeechFault),
    /// Nothing to do
    Ignored,
}

/// Turns raw recognizer events into movement commands.
///
/// Only final transcripts are considered; identical transcripts inside
/// [`DEDUPE_WINDOW_MS`] are coalesced so a recognizer that re-emits the
/// same phrase does not double-move the airplane.
#[derive(Debug, Default)]
pub struct SpeechIntake {
    last_text: Option<String>,
    last_accepted_ms: u64,
    indicator_text: Option<String>,
    indicator_until_ms: u64,
}

impl SpeechIntake {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear per-round state at the start of a new round.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Process one recognizer event. `round_active` gates the
    /// restart-on-natural-end behavior: recognition is kept alive only
    /// while a round is in progress.
    pub fn handle(&mut self, event: SpeechEvent, now_ms: u64, round_active: bool) -> SpeechOutcome {
        match event {
            SpeechEvent::Transcript { text, is_final } => {
                if !is_final {
                    return SpeechOutcome::Ignored;
                }

                let commands = commands_in_transcript(&text);
                if commands.is_empty() {
                    debug!(transcript = %text, "no movement keyword in transcript");
                    return SpeechOutcome::Ignored;
                }

                let duplicate = self.last_text.as_deref() == Some(text.as_str())
                    && now_ms.saturating_sub(self.last_accepted_ms) < DEDUPE_WINDOW_MS;
                if duplicate {
                    debug!(transcript = %text, "duplicate transcript coalesced");
                    return SpeechOutcome::Ignored;
                }

                self.last_text = Some(text.clone());
                self.last_accepted_ms = now_ms;
                self.indicator_text = Some(text);
                self.indicator_until_ms = now_ms + INDICATOR_MS;

                SpeechOutcome::Commands(commands)
            }
            SpeechEvent::Fault(SpeechFault::PermissionDenied) => {
                SpeechOutcome::Fatal(SpeechFault::PermissionDenied)
            }
            SpeechEvent::Fault(SpeechFault::NoSpeech) => {
                debug!("recognizer heard no speech, waiting");
                SpeechOutcome::Ignored
            }
            SpeechEvent::Fault(fault) => {
                warn!(error = %fault, "recognizer fault, continuing");
                SpeechOutcome::Ignored
            }
            SpeechEvent::Ended => {
                if round_active {
                    SpeechOutcome::Restart
                } else {
                    SpeechOutcome::Ignored
                }
            }
        }
    }

    /// Transcript to display as the last accepted command, until it
    /// expires.
    pub fn indicator(&self, now_ms: u64) -> Option<&str> {
        if now_ms >= self.indicator_until_ms {
            return None;
        }
        self.indicator_text.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn final_transcript(text: &str) -> SpeechEvent {
        SpeechEvent::Transcript {
            text: text.to_string(),
            is_final: true,
        }
    }

    #[test]
    fn interim_transcripts_are_ignored() {
        let mut intake = SpeechIntake::new();
        let outcome = intake.handle(
            SpeechEvent::Transcript {
                text: "up".to_string(),
                is_final: false,
            },
            1_000,
            true,
        );
        assert_eq!(outcome, SpeechOutcome::Ignored);
    }

    #[test]
    fn final_transcript_yields_commands() {
        let mut intake = SpeechIntake::new();
        let outcome = intake.handle(final_transcript("go up and left"), 1_000, true);
        assert_eq!(
            outcome,
            SpeechOutcome::Commands(vec![Command::Up, Command::Left])
        );
    }

    #[test]
    fn duplicate_inside_window_is_coalesced() {
        let mut intake = SpeechIntake::new();
        assert_eq!(
            intake.handle(final_transcript("up"), 1_000, true),
            SpeechOutcome::Commands(vec![Command::Up])
        );
        assert_eq!(
            intake.handle(final_transcript("up"), 1_499, true),
            SpeechOutcome::Ignored
        );
        // Window is strict: exactly DEDUPE_WINDOW_MS later is accepted
        assert_eq!(
            intake.handle(final_transcript("up"), 1_500, true),
            SpeechOutcome::Commands(vec![Command::Up])
        );
    }

    #[test]
    fn different_transcript_inside_window_is_accepted() {
        let mut intake = SpeechIntake::new();
        intake.handle(final_transcript("up"), 1_000, true);
        assert_eq!(
            intake.handle(final_transcript("down"), 1_100, true),
            SpeechOutcome::Commands(vec![Command::Down])
        );
    }

    #[test]
    fn permission_denied_is_fatal() {
        let mut intake = SpeechIntake::new();
        let outcome = intake.handle(
            SpeechEvent::Fault(SpeechFault::PermissionDenied),
            1_000,
            true,
        );
        assert_eq!(outcome, SpeechOutcome::Fatal(SpeechFault::PermissionDenied));
    }

    #[test]
    fn no_speech_is_ignored() {
        let mut intake = SpeechIntake::new();
        let outcome = intake.handle(SpeechEvent::Fault(SpeechFault::NoSpeech), 1_000, true);
        assert_eq!(outcome, SpeechOutcome::Ignored);
    }

    #[test]
    fn natural_end_restarts_only_while_round_active() {
        let mut intake = SpeechIntake::new();
        assert_eq!(
            intake.handle(SpeechEvent::Ended, 1_000, true),
            SpeechOutcome::Restart
        );
        assert_eq!(
            intake.handle(SpeechEvent::Ended, 1_000, false),
            SpeechOutcome::Ignored
        );
    }

    #[test]
    fn indicator_expires_after_window() {
        let mut intake = SpeechIntake::new();
        intake.handle(final_transcript("up"), 1_000, true);
        assert_eq!(intake.indicator(1_500), Some("up"));
        assert_eq!(intake.indicator(1_999), Some("up"));
        assert_eq!(intake.indicator(2_000), None);
    }

    #[test]
    fn transcripts_without_keywords_do_not_set_indicator() {
        let mut intake = SpeechIntake::new();
        intake.handle(final_transcript("hello"), 1_000, true);
        assert_eq!(intake.indicator(1_100), None);
    }
}
