//! Sky Racer - dual-mode obstacle-avoidance arcade engine
//!
//! Core modules:
//! - `game`: simulation model, the local engine, and the remote mirror
//! - `command`: movement commands and the speech intake
//! - `vision`: hand tracking seam and gesture zone classification
//! - `session`: round controllers for the voice and gesture modalities
//! - `ws`: the gesture session service (socket protocol and actor)
//! - `api`: platform API client (scores, stats, session bootstrap)
//! - `render`: pure scene construction from a state snapshot

pub mod api;
pub mod app;
pub mod command;
pub mod config;
pub mod game;
pub mod http;
pub mod render;
pub mod session;
pub mod util;
pub mod vision;
pub mod ws;
