//! Integration tests for the HTTP API.
//!
//! Each request goes through axum's oneshot pattern (via tower::ServiceExt)
//! against in-memory stores, so no TCP port or database is needed.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tokio_test::assert_ok;
use tower::ServiceExt;
use uuid::Uuid;

use codenames_server::{
    create_router,
    dictionary::WordList,
    models::WordPack,
    oracle::DisabledOracle,
    routes::PLAYER_ID_HEADER,
    store::{MemoryGameStore, MemoryWordPackStore},
    AppState,
};

fn state() -> Arc<AppState> {
    let pack = WordPack::default_pack("Standard", "en");
    Arc::new(AppState::new(
        Arc::new(MemoryGameStore::new()),
        Arc::new(MemoryWordPackStore::with_pack(
            pack,
            WordList::builtin().into_words(),
        )),
        Arc::new(DisabledOracle),
        12,
    ))
}

/// Send one request and return status plus JSON body (`Null` when empty)
async fn send(
    state: &Arc<AppState>,
    method: Method,
    uri: &str,
    player: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(id) = player {
        request = request.header(PLAYER_ID_HEADER, id);
    }
    let request = match body {
        Some(json) => request
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let resp = create_router(state.clone()).oneshot(request).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

struct Room {
    game: String,
    code: String,
    host: String,
}

async fn create_room(state: &Arc<AppState>) -> Room {
    let (status, json) = send(
        state,
        Method::POST,
        "/api/rooms",
        None,
        Some(json!({"name": "Friday night", "nickname": "alice"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    Room {
        game: json["game"]["id"].as_str().unwrap().to_string(),
        code: json["game"]["code"].as_str().unwrap().to_string(),
        host: json["player"]["id"].as_str().unwrap().to_string(),
    }
}

async fn join(state: &Arc<AppState>, code: &str, nickname: &str) -> String {
    let (status, json) = send(
        state,
        Method::POST,
        "/api/rooms/join",
        None,
        Some(json!({"code": code, "nickname": nickname})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    json["player"]["id"].as_str().unwrap().to_string()
}

async fn seat(state: &Arc<AppState>, game: &str, player: &str, team: &str, role: &str) {
    let (status, json) = send(
        state,
        Method::PUT,
        &format!("/api/games/{game}/players/{player}"),
        Some(player),
        Some(json!({"team": team, "role": role})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "seating failed: {json}");
}

/// Started game: host is red codegiver, then red guesser, blue codegiver
struct Table {
    room: Room,
    red_guesser: String,
}

async fn started_table(state: &Arc<AppState>) -> Table {
    let room = create_room(state).await;
    let red_guesser = join(state, &room.code, "bob").await;
    let blue_codegiver = join(state, &room.code, "carol").await;
    seat(state, &room.game, &room.host, "red", "codegiver").await;
    seat(state, &room.game, &red_guesser, "red", "guesser").await;
    seat(state, &room.game, &blue_codegiver, "blue", "codegiver").await;

    let (status, json) = send(
        state,
        Method::POST,
        &format!("/api/games/{}/start", room.game),
        Some(&room.host),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "start failed: {json}");
    Table { room, red_guesser }
}

// ── GET /health ──────────────────────────────────────────────────────

#[tokio::test]
async fn health_returns_200() {
    let (status, json) = send(&state(), Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["service"], "codenames-server");
    assert_eq!(json["watched_games"], 0);
}

// ── Rooms ────────────────────────────────────────────────────────────

#[tokio::test]
async fn word_packs_lists_default() {
    let (status, json) = send(&state(), Method::GET, "/api/word-packs", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json[0]["is_default"], true);
}

#[tokio::test]
async fn create_room_makes_caller_host() {
    let state = state();
    let room = create_room(&state).await;
    assert_ok!(Uuid::parse_str(&room.game));
    assert_eq!(room.code.len(), 6);

    let (status, json) = send(
        &state,
        Method::GET,
        &format!("/api/games/{}", room.game),
        Some(&room.host),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "waiting");
    assert_eq!(json["players"][0]["is_host"], true);
}

#[tokio::test]
async fn create_room_rejects_blank_nickname() {
    let (status, json) = send(
        &state(),
        Method::POST,
        "/api/rooms",
        None,
        Some(json!({"name": "Room", "nickname": "   "})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "bad_request");
}

#[tokio::test]
async fn join_unknown_room_is_404() {
    let (status, json) = send(
        &state(),
        Method::POST,
        "/api/rooms/join",
        None,
        Some(json!({"code": "ZZZZZZ", "nickname": "bob"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "room_not_found");
    assert_eq!(json["retryable"], false);
}

#[tokio::test]
async fn unknown_game_is_404() {
    let (status, json) = send(
        &state(),
        Method::GET,
        &format!("/api/games/{}", Uuid::new_v4()),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "session_not_found");
}

#[tokio::test]
async fn second_codegiver_is_conflict() {
    let state = state();
    let room = create_room(&state).await;
    let bob = join(&state, &room.code, "bob").await;
    seat(&state, &room.game, &room.host, "red", "codegiver").await;

    let (status, json) = send(
        &state,
        Method::PUT,
        &format!("/api/games/{}/players/{}", room.game, bob),
        Some(&bob),
        Some(json!({"team": "red", "role": "codegiver"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], "role_taken");
}

#[tokio::test]
async fn host_can_remove_player() {
    let state = state();
    let room = create_room(&state).await;
    let bob = join(&state, &room.code, "bob").await;

    let (status, _) = send(
        &state,
        Method::DELETE,
        &format!("/api/games/{}/players/{}", room.game, bob),
        Some(&room.host),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, json) = send(
        &state,
        Method::GET,
        &format!("/api/games/{}", room.game),
        None,
        None,
    )
    .await;
    assert_eq!(json["players"].as_array().unwrap().len(), 1);
}

// ── Game flow ────────────────────────────────────────────────────────

#[tokio::test]
async fn start_without_teams_is_rejected() {
    let state = state();
    let room = create_room(&state).await;
    let (status, json) = send(
        &state,
        Method::POST,
        &format!("/api/games/{}/start", room.game),
        Some(&room.host),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "not_ready");
}

#[tokio::test]
async fn commands_require_identity() {
    let state = state();
    let room = create_room(&state).await;
    let (status, _) = send(
        &state,
        Method::POST,
        &format!("/api/games/{}/start", room.game),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn codegiver_sees_key_guesser_does_not() {
    let state = state();
    let table = started_table(&state).await;
    let uri = format!("/api/games/{}", table.room.game);

    let (_, codegiver_view) = send(&state, Method::GET, &uri, Some(&table.room.host), None).await;
    let (_, guesser_view) = send(&state, Method::GET, &uri, Some(&table.red_guesser), None).await;

    let cards = codegiver_view["cards"].as_array().unwrap();
    assert_eq!(cards.len(), 25);
    assert!(cards.iter().all(|c| !c["card_type"].is_null()));
    assert!(guesser_view["cards"]
        .as_array()
        .unwrap()
        .iter()
        .all(|c| c["card_type"].is_null()));
    assert_eq!(guesser_view["current_turn"], "red");
}

#[tokio::test]
async fn guess_before_hint_is_rejected() {
    let state = state();
    let table = started_table(&state).await;
    let (_, view) = send(
        &state,
        Method::GET,
        &format!("/api/games/{}", table.room.game),
        None,
        None,
    )
    .await;
    let card = view["cards"][0]["id"].as_str().unwrap();

    let (status, json) = send(
        &state,
        Method::POST,
        &format!("/api/games/{}/cards/{}/reveal", table.room.game, card),
        Some(&table.red_guesser),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "no_active_hint");
}

#[tokio::test]
async fn hint_then_reveal() {
    let state = state();
    let table = started_table(&state).await;
    let game = &table.room.game;

    let (status, hint) = send(
        &state,
        Method::POST,
        &format!("/api/games/{game}/hints"),
        Some(&table.room.host),
        Some(json!({"word": "zoology", "count": 2})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(hint["team"], "red");

    let (_, view) = send(
        &state,
        Method::GET,
        &format!("/api/games/{game}"),
        Some(&table.room.host),
        None,
    )
    .await;
    assert_eq!(view["hint_active"], true);
    let red_card = view["cards"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["card_type"] == "red")
        .unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();

    let (status, outcome) = send(
        &state,
        Method::POST,
        &format!("/api/games/{game}/cards/{red_card}/reveal"),
        Some(&table.red_guesser),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["card"]["revealed"], true);
    assert_eq!(outcome["next_turn"], "red");
    assert_eq!(outcome["turn_changed"], false);

    let (status, json) = send(
        &state,
        Method::POST,
        &format!("/api/games/{game}/cards/{red_card}/reveal"),
        Some(&table.red_guesser),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], "already_revealed");
}

#[tokio::test]
async fn hint_on_board_is_rejected() {
    let state = state();
    let table = started_table(&state).await;
    let game = &table.room.game;
    let (_, view) = send(&state, Method::GET, &format!("/api/games/{game}"), None, None).await;
    let word = view["cards"][3]["word"].as_str().unwrap().to_lowercase();

    let (status, json) = send(
        &state,
        Method::POST,
        &format!("/api/games/{game}/hints"),
        Some(&table.room.host),
        Some(json!({"word": word, "count": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "hint_on_board");
}

#[tokio::test]
async fn guesser_cannot_give_hint() {
    let state = state();
    let table = started_table(&state).await;
    let (status, json) = send(
        &state,
        Method::POST,
        &format!("/api/games/{}/hints", table.room.game),
        Some(&table.red_guesser),
        Some(json!({"word": "zoology", "count": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["error"], "wrong_role");
}

#[tokio::test]
async fn pass_hands_turn_over() {
    let state = state();
    let table = started_table(&state).await;
    let (status, json) = send(
        &state,
        Method::POST,
        &format!("/api/games/{}/pass", table.room.game),
        Some(&table.red_guesser),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["current_turn"], "blue");
}

#[tokio::test]
async fn automated_hint_without_oracle_is_bad_gateway() {
    let state = state();
    let room = create_room(&state).await;
    let red_guesser = join(&state, &room.code, "bob").await;
    seat(&state, &room.game, &room.host, "blue", "codegiver").await;
    seat(&state, &room.game, &red_guesser, "red", "guesser").await;
    let (status, _) = send(
        &state,
        Method::POST,
        &format!("/api/games/{}/automated-codegivers", room.game),
        Some(&room.host),
        Some(json!({"team": "red"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = send(
        &state,
        Method::POST,
        &format!("/api/games/{}/start", room.game),
        Some(&room.host),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // The blue host may not ask for red's clue
    let (status, json) = send(
        &state,
        Method::POST,
        &format!("/api/games/{}/hints/automated", room.game),
        Some(&room.host),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["error"], "not_your_turn");

    let (status, json) = send(
        &state,
        Method::POST,
        &format!("/api/games/{}/hints/automated", room.game),
        Some(&red_guesser),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["error"], "oracle_failed");
    assert_eq!(json["retryable"], true);
}

// ── Room browser ─────────────────────────────────────────────────────

#[tokio::test]
async fn public_rooms_are_browsable() {
    let state = state();
    let (status, _) = send(
        &state,
        Method::POST,
        "/api/rooms",
        None,
        Some(json!({"name": "Open table", "nickname": "alice", "is_public": true})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    // Rooms are private unless asked otherwise
    let private = create_room(&state).await;

    let (status, json) = send(&state, Method::GET, "/api/rooms", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let rooms = json.as_array().unwrap();
    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0]["name"], "Open table");
    assert_eq!(rooms[0]["player_count"], 1);
    assert_eq!(rooms[0]["max_players"], 12);
    assert_ne!(rooms[0]["code"], private.code.as_str());
}

// ── Word packs ───────────────────────────────────────────────────────

#[tokio::test]
async fn word_pack_lifecycle() {
    let state = state();
    let (status, json) = send(
        &state,
        Method::POST,
        "/api/word-packs",
        None,
        Some(json!({
            "name": "Kitchen",
            "description": "Things in a kitchen",
            "words": ["fork", "spoon", "Spoon", "kettle"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {json}");
    assert_eq!(json["words"], json!(["FORK", "SPOON", "KETTLE"]));
    assert_eq!(json["is_public"], true);
    let id = json["pack_id"].as_str().unwrap().to_string();

    let (status, json) = send(
        &state,
        Method::POST,
        &format!("/api/word-packs/{id}/words"),
        None,
        Some(json!({"words": ["oven"]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["words"].as_array().unwrap().len(), 4);

    let (status, _) = send(
        &state,
        Method::DELETE,
        &format!("/api/word-packs/{id}/words/fork"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, json) = send(
        &state,
        Method::PUT,
        &format!("/api/word-packs/{id}"),
        None,
        Some(json!({"name": "Cookware"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "Cookware");
    assert_eq!(json["description"], "Things in a kitchen");

    let (_, json) = send(&state, Method::GET, "/api/word-packs", None, None).await;
    assert_eq!(json.as_array().unwrap().len(), 2);

    let (status, json) = send(
        &state,
        Method::GET,
        &format!("/api/word-packs/{id}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["words"], json!(["SPOON", "KETTLE", "OVEN"]));

    let (status, _) = send(
        &state,
        Method::DELETE,
        &format!("/api/word-packs/{id}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, json) = send(
        &state,
        Method::GET,
        &format!("/api/word-packs/{id}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "word_pack_not_found");
}

#[tokio::test]
async fn default_word_pack_cannot_be_deleted() {
    let state = state();
    let (_, json) = send(&state, Method::GET, "/api/word-packs", None, None).await;
    let id = json[0]["pack_id"].as_str().unwrap().to_string();

    let (status, json) = send(
        &state,
        Method::DELETE,
        &format!("/api/word-packs/{id}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "bad_request");
}
