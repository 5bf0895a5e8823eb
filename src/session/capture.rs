//! Camera seam for the remote mode.
//!
//! The frame pump only talks to [`FrameSource`]; the actual device
//! (a webcam behind a permission prompt, a file, a script) sits behind
//! it. Frames travel as the same `data:image/...;base64,` payloads the
//! session protocol carries.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

/// Lifecycle of a capture device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// Permission prompt outstanding; no frames yet
    Pending,
    /// Device delivering frames
    Ready,
    /// Permission refused; fatal to the gesture modality
    Denied,
    /// Device released; terminal
    Released,
}

/// A source of encoded camera frames.
///
/// Implementations are polled from the frame pump at the transmit
/// cadence, so `poll_frame` must be cheap and must never block. A
/// source with no fresh frame returns `None` and the send is skipped;
/// the pump never outruns the device.
pub trait FrameSource: Send + Sync {
    fn state(&self) -> CaptureState;

    /// Next encoded frame as a data URL, if one is available.
    fn poll_frame(&self) -> Option<String>;

    /// Release the device. Safe to call more than once.
    fn release(&self);
}

/// Frame source that serves the same encoded frame forever. Stands in
/// for a live camera in demos and tests.
#[derive(Debug)]
pub struct StaticCamera {
    frame: String,
    released: AtomicBool,
}

impl StaticCamera {
    pub fn new(frame: String) -> Self {
        Self {
            frame,
            released: AtomicBool::new(false),
        }
    }
}

impl FrameSource for StaticCamera {
    fn state(&self) -> CaptureState {
        if self.released.load(Ordering::Acquire) {
            CaptureState::Released
        } else {
            CaptureState::Ready
        }
    }

    fn poll_frame(&self) -> Option<String> {
        if self.released.load(Ordering::Acquire) {
            return None;
        }
        Some(self.frame.clone())
    }

    fn release(&self) {
        self.released.store(true, Ordering::Release);
    }
}

/// Frame source that plays a fixed script, one entry per poll, then
/// runs dry. `None` entries model ticks where the device had no fresh
/// frame.
#[derive(Debug, Default)]
pub struct ScriptedCamera {
    script: Mutex<VecDeque<Option<String>>>,
    released: AtomicBool,
}

impl ScriptedCamera {
    pub fn new(script: impl IntoIterator<Item = Option<String>>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            released: AtomicBool::new(false),
        }
    }
}

impl FrameSource for ScriptedCamera {
    fn state(&self) -> CaptureState {
        if self.released.load(Ordering::Acquire) {
            CaptureState::Released
        } else {
            CaptureState::Ready
        }
    }

    fn poll_frame(&self) -> Option<String> {
        if self.released.load(Ordering::Acquire) {
            return None;
        }
        self.script.lock().pop_front().flatten()
    }

    fn release(&self) {
        self.released.store(true, Ordering::Release);
    }
}
