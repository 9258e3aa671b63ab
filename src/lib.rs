pub mod broadcast;
pub mod config;
pub mod db;
pub mod dictionary;
pub mod error;
pub mod game;
pub mod models;
pub mod oracle;
pub mod routes;
pub mod service;
pub mod store;
pub mod utils;
pub mod websocket;

use std::sync::Arc;

use axum::{routing::get, Router};

use broadcast::ChannelBroadcaster;
use oracle::HintOracle;
use service::GameService;
use store::{GameStore, WordPackStore};

/// Application state shared across all handlers
pub struct AppState {
    pub service: GameService,
    /// Same broadcaster the service publishes to; sockets subscribe here
    pub events: Arc<ChannelBroadcaster>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn GameStore>,
        word_packs: Arc<dyn WordPackStore>,
        oracle: Arc<dyn HintOracle>,
        max_players: usize,
    ) -> Self {
        let events = Arc::new(ChannelBroadcaster::new());
        let service = GameService::new(store, word_packs, events.clone(), oracle)
            .with_max_players(max_players);
        Self { service, events }
    }
}

/// All HTTP and WebSocket routes, without middleware
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ws/{id}", get(websocket::handle_websocket))
        .merge(routes::create_routes())
        .with_state(state)
}
