pub mod games;
pub mod health;
pub mod identity;
pub mod rooms;
pub mod word_packs;

use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::AppState;

pub use identity::{MaybePlayer, PlayerIdentity, PLAYER_ID_HEADER};

pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", api_routes())
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/word-packs",
            get(word_packs::list_word_packs).post(word_packs::create_word_pack),
        )
        .route(
            "/word-packs/{id}",
            get(word_packs::get_word_pack)
                .put(word_packs::update_word_pack)
                .delete(word_packs::delete_word_pack),
        )
        .route("/word-packs/{id}/words", post(word_packs::add_words))
        .route(
            "/word-packs/{id}/words/{word}",
            delete(word_packs::delete_word),
        )
        .route(
            "/rooms",
            get(rooms::list_public_rooms).post(rooms::create_room),
        )
        .route("/rooms/join", post(rooms::join_room))
        .route("/games/{id}", get(games::get_game))
        .route(
            "/games/{id}/players/{player_id}",
            put(games::update_player).delete(games::remove_player),
        )
        .route(
            "/games/{id}/automated-codegivers",
            post(games::add_automated_codegiver),
        )
        .route("/games/{id}/start", post(games::start_game))
        .route("/games/{id}/hints", post(games::give_hint))
        .route(
            "/games/{id}/hints/automated",
            post(games::request_automated_hint),
        )
        .route(
            "/games/{id}/cards/{card_id}/reveal",
            post(games::reveal_card),
        )
        .route("/games/{id}/pass", post(games::pass_turn))
}
