//! ptb-bridge: automation bridge between HTTP callers and a remote
//! digital-audio-workstation command service.
//!
//! Layers, bottom up: `ptsl` (wire transport, command registry, session
//! client, raw gateway), `audio` (local WAV/AIFF header inspection),
//! `import` (batch import and spot orchestration), `api` (HTTP boundary
//! with per-request write gating).

pub mod api;
pub mod audio;
pub mod error;
pub mod import;
pub mod ptsl;

pub use api::{build_router, AppState};
pub use error::{ApiError, BridgeError};
