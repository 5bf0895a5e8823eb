//! Round controllers for both control modalities

pub mod capture;
pub mod controller;
pub mod voice;

pub use capture::{CaptureState, FrameSource, ScriptedCamera, StaticCamera};
pub use controller::{RemoteSession, SessionError, Telemetry};
pub use voice::VoiceSession;
