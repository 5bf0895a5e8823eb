//! Hand tracking seam and gesture zone classification

use std::collections::VecDeque;
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine};
use thiserror::Error;

use crate::command::Command;

/// Minimum offset from the frame center before a zone registers
pub const ZONE_THRESHOLD: f32 = 0.15;

/// Normalized palm location inside a camera frame. Both axes run
/// 0.0..=1.0 with the origin at the top-left of the mirrored
/// presentation frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandPoint {
    pub x: f32,
    pub y: f32,
}

impl HandPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Palm-position inference over a camera frame.
///
/// Implementations wrap an external CV model; the game only needs the
/// normalized palm point and treats everything upstream of it as a
/// black box. Trackers may keep per-stream state, so each session gets
/// its own instance through a [`TrackerFactory`].
pub trait HandTracker: Send + Sync {
    /// Locate the palm in a decoded JPEG frame. None means no hand.
    fn locate(&mut self, frame: &[u8]) -> Option<HandPoint>;
}

/// Builds one tracker per session.
pub type TrackerFactory = Arc<dyn Fn() -> Box<dyn HandTracker> + Send + Sync>;

/// Tracker that never reports a hand. Used until a CV backend is
/// wired in, and by deployments that only serve the voice mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTracker;

impl HandTracker for NoopTracker {
    fn locate(&mut self, _frame: &[u8]) -> Option<HandPoint> {
        None
    }
}

/// Tracker that replays a scripted sequence of palm positions, then
/// holds the final entry. Used by integration tests and demos.
#[derive(Debug, Default)]
pub struct ScriptedTracker {
    script: VecDeque<Option<HandPoint>>,
}

impl ScriptedTracker {
    pub fn new(script: impl IntoIterator<Item = Option<HandPoint>>) -> Self {
        Self {
            script: script.into_iter().collect(),
        }
    }

    /// Script that reports the same palm position forever.
    pub fn holding(point: HandPoint) -> Self {
        Self::new([Some(point)])
    }
}

impl HandTracker for ScriptedTracker {
    fn locate(&mut self, _frame: &[u8]) -> Option<HandPoint> {
        if self.script.len() > 1 {
            self.script.pop_front().flatten()
        } else {
            self.script.front().copied().flatten()
        }
    }
}

/// Map a palm position to a movement command by its offset from the
/// frame center. Vertical zones win over horizontal ones when the palm
/// sits in a corner; a palm near the center maps to no command.
pub fn classify_zone(point: HandPoint) -> Command {
    let dx = point.x - 0.5;
    let dy = point.y - 0.5;

    if dy < -ZONE_THRESHOLD {
        Command::Up
    } else if dy > ZONE_THRESHOLD {
        Command::Down
    } else if dx < -ZONE_THRESHOLD {
        Command::Left
    } else if dx > ZONE_THRESHOLD {
        Command::Right
    } else {
        Command::None
    }
}

/// Human-readable line shown next to the camera preview.
pub fn describe(gesture: Command, point: Option<HandPoint>) -> String {
    match point {
        Some(p) if gesture.is_motion() => format!(
            "{} - hand at ({:.2}, {:.2})",
            gesture.label().to_uppercase(),
            p.x,
            p.y
        ),
        Some(p) => format!("Hand at ({:.2}, {:.2})", p.x, p.y),
        None => "No hand detected".to_string(),
    }
}

/// Camera frame payload faults
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("frame payload is not a data URL")]
    NotDataUrl,
    #[error("unsupported media type in frame payload: {0}")]
    UnsupportedMediaType(String),
    #[error("invalid base64 in frame payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Split a `data:image/...;base64,` payload and decode the image
/// bytes.
pub fn decode_frame_payload(payload: &str) -> Result<Vec<u8>, FrameError> {
    let (header, body) = payload.split_once(',').ok_or(FrameError::NotDataUrl)?;
    let media = header
        .strip_prefix("data:")
        .and_then(|h| h.strip_suffix(";base64"))
        .ok_or(FrameError::NotDataUrl)?;
    if !media.starts_with("image/") {
        return Err(FrameError::UnsupportedMediaType(media.to_string()));
    }
    Ok(STANDARD.decode(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zones_map_by_center_offset() {
        assert_eq!(classify_zone(HandPoint::new(0.5, 0.2)), Command::Up);
        assert_eq!(classify_zone(HandPoint::new(0.5, 0.8)), Command::Down);
        assert_eq!(classify_zone(HandPoint::new(0.2, 0.5)), Command::Left);
        assert_eq!(classify_zone(HandPoint::new(0.8, 0.5)), Command::Right);
        assert_eq!(classify_zone(HandPoint::new(0.5, 0.5)), Command::None);
    }

    #[test]
    fn vertical_zones_win_in_corners() {
        assert_eq!(classify_zone(HandPoint::new(0.9, 0.1)), Command::Up);
        assert_eq!(classify_zone(HandPoint::new(0.1, 0.9)), Command::Down);
    }

    #[test]
    fn threshold_is_strict() {
        // Exactly on the band edge is still the dead zone
        assert_eq!(classify_zone(HandPoint::new(0.5, 0.35)), Command::None);
        assert_eq!(classify_zone(HandPoint::new(0.65, 0.5)), Command::None);
        assert_eq!(classify_zone(HandPoint::new(0.5, 0.349)), Command::Up);
        assert_eq!(classify_zone(HandPoint::new(0.651, 0.5)), Command::Right);
    }

    #[test]
    fn descriptions_name_the_zone() {
        let point = HandPoint::new(0.42, 0.18);
        assert_eq!(
            describe(Command::Up, Some(point)),
            "UP - hand at (0.42, 0.18)"
        );
        assert_eq!(
            describe(Command::None, Some(HandPoint::new(0.5, 0.5))),
            "Hand at (0.50, 0.50)"
        );
        assert_eq!(describe(Command::None, None), "No hand detected");
    }

    #[test]
    fn frame_payload_decodes() {
        let payload = format!("data:image/jpeg;base64,{}", STANDARD.encode(b"jpegbytes"));
        assert_eq!(decode_frame_payload(&payload).unwrap(), b"jpegbytes");
    }

    #[test]
    fn frame_payload_rejects_non_images() {
        let payload = format!("data:text/plain;base64,{}", STANDARD.encode(b"hi"));
        assert!(matches!(
            decode_frame_payload(&payload),
            Err(FrameError::UnsupportedMediaType(_))
        ));
    }

    #[test]
    fn frame_payload_rejects_malformed_input() {
        assert!(matches!(
            decode_frame_payload("not a data url"),
            Err(FrameError::NotDataUrl)
        ));
        assert!(matches!(
            decode_frame_payload("data:image/jpeg;base64"),
            Err(FrameError::NotDataUrl)
        ));
        assert!(matches!(
            decode_frame_payload("data:image/jpeg;base64,@@@"),
            Err(FrameError::Base64(_))
        ));
    }

    #[test]
    fn scripted_tracker_holds_its_last_entry() {
        let mut tracker = ScriptedTracker::new([
            Some(HandPoint::new(0.5, 0.1)),
            None,
            Some(HandPoint::new(0.9, 0.5)),
        ]);
        assert_eq!(tracker.locate(b""), Some(HandPoint::new(0.5, 0.1)));
        assert_eq!(tracker.locate(b""), None);
        assert_eq!(tracker.locate(b""), Some(HandPoint::new(0.9, 0.5)));
        assert_eq!(tracker.locate(b""), Some(HandPoint::new(0.9, 0.5)));
    }
}
