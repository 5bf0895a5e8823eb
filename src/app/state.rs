//! Application state shared across routes

use std::sync::Arc;

use crate::config::{Config, TrackerBackend};
use crate::game::EngineConfig;
use crate::vision::{HandTracker, NoopTracker, TrackerFactory};
use crate::ws::SessionRegistry;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub sessions: Arc<SessionRegistry>,
    /// Builds one hand tracker per session
    pub trackers: TrackerFactory,
    /// Round tuning for sessions this service hosts
    pub engine_config: EngineConfig,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let trackers: TrackerFactory = match config.hand_tracker {
            TrackerBackend::Off => Arc::new(|| Box::new(NoopTracker) as Box<dyn HandTracker>),
        };

        Self {
            config: Arc::new(config),
            sessions: Arc::new(SessionRegistry::new()),
            trackers,
            engine_config: EngineConfig::default(),
        }
    }

    /// Swap the tracker factory, for deployments wiring in a real CV
    /// backend and for tests scripting palm positions.
    pub fn with_trackers(mut self, trackers: TrackerFactory) -> Self {
        self.trackers = trackers;
        self
    }

    /// Override round tuning, mainly for tests that need fast rounds.
    pub fn with_engine_config(mut self, engine_config: EngineConfig) -> Self {
        self.engine_config = engine_config;
        self
    }
}
