use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::AppState;

/// Liveness plus how many games currently have live listeners
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "codenames-server",
        "version": env!("CARGO_PKG_VERSION"),
        "watched_games": state.events.channel_count(),
    }))
}
