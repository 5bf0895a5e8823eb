//! Game simulation modules

pub mod engine;
pub mod model;
pub mod proxy;

pub use engine::{EngineConfig, LocalEngine, TickEvent};
pub use model::{
    Airplane, GameState, Obstacle, ObstacleKind, BOUNDARY_HORIZONTAL, BOUNDARY_VERTICAL,
    CANVAS_HEIGHT, CANVAS_WIDTH,
};
pub use proxy::RemoteProxy;

use crate::command::Command;

/// The authority a round runs under.
///
/// The display layer and the score client only ever see this enum, so
/// switching between the in-process engine and the remote mirror never
/// leaks past the controller that owns it.
pub enum SimulationSource {
    /// Round simulated in-process, commands applied directly
    Local(LocalEngine),
    /// Round simulated by the remote session service
    Remote(RemoteProxy),
}

impl SimulationSource {
    pub fn current_state(&self) -> &GameState {
        match self {
            Self::Local(engine) => engine.state(),
            Self::Remote(proxy) => proxy.state(),
        }
    }

    /// Queue a movement command. Remote rounds ignore this: their
    /// input travels to the authority as camera frames.
    pub fn dispatch(&mut self, command: Command) {
        match self {
            Self::Local(engine) => engine.dispatch(command),
            Self::Remote(_) => {}
        }
    }

    /// Begin a fresh round.
    pub fn start(&mut self, now_ms: u64) {
        match self {
            Self::Local(engine) => engine.start(now_ms),
            Self::Remote(proxy) => proxy.clear(),
        }
    }

    /// Halt a local round in place. Remote rounds stop by tearing the
    /// session down; the mirrored state stays visible.
    pub fn stop(&mut self) {
        match self {
            Self::Local(engine) => engine.halt(),
            Self::Remote(_) => {}
        }
    }

    /// Advance a local round. Remote rounds advance on snapshot
    /// arrival instead and never produce events here.
    pub fn tick(&mut self, now_ms: u64) -> Vec<TickEvent> {
        match self {
            Self::Local(engine) => engine.tick(now_ms),
            Self::Remote(_) => Vec::new(),
        }
    }
}
