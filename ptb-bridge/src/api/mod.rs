//! HTTP boundary for the automation bridge
//!
//! A small JSON API: a health probe and a single tool-dispatch endpoint.
//! Write gating happens here, per request, against the freshly re-read
//! permission policy.

pub mod health;
pub mod tools;

use crate::ptsl::client::PtslClient;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

/// Shared state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// The single workstation session; exchanges are serialized through
    /// this lock, matching the one-in-flight wire contract
    pub client: Arc<Mutex<PtslClient>>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(client: PtslClient) -> Self {
        Self {
            client: Arc::new(Mutex::new(client)),
            started_at: Instant::now(),
        }
    }
}

/// Build the bridge router with all routes registered.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/tools", post(tools::run_tool))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
