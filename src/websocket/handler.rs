use crate::{
    broadcast::GameEvent,
    error::ServiceError,
    routes::MaybePlayer,
    websocket::messages::{ClientMessage, ServerMessage},
    AppState,
};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use std::sync::Arc;
use tokio::sync::{broadcast::error::RecvError, mpsc};
use uuid::Uuid;

/// WebSocket upgrade handler. Anyone may watch a game; only known players
/// can send commands.
pub async fn handle_websocket(
    ws: WebSocketUpgrade,
    Path(game_id): Path<Uuid>,
    MaybePlayer(player_id): MaybePlayer,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ServiceError> {
    // Fail the upgrade for unknown games instead of opening a dead socket
    state.service.session_view(game_id, player_id).await?;

    tracing::info!(
        "WebSocket upgrade for game {} (player {:?})",
        game_id,
        player_id
    );
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, game_id, player_id)))
}

/// Handle individual WebSocket connection
async fn handle_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    game_id: Uuid,
    player_id: Option<Uuid>,
) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<ServerMessage>(100);

    // Subscribe before taking the snapshot so nothing falls in between
    let mut events = state.events.subscribe(game_id);
    send_state(&state, game_id, player_id, &tx).await;

    // Spawn a task to send messages to the client
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!("Failed to serialize message: {}", e);
                }
            }
        }
    });

    // Forward game events to this client
    let state_for_events = state.clone();
    let tx_for_events = tx.clone();
    let mut event_task = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(envelope) => {
                    // The public board carries no key; codegivers need theirs
                    let dealt = matches!(envelope.event, GameEvent::GameStarted { .. });
                    if tx_for_events.send(ServerMessage::Event(envelope)).await.is_err() {
                        break;
                    }
                    if dealt {
                        send_state(&state_for_events, game_id, player_id, &tx_for_events).await;
                    }
                }
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!(
                        "Subscriber for game {} lagged by {} events, resyncing",
                        game_id,
                        missed
                    );
                    let _ = tx_for_events.send(ServerMessage::Resync { missed }).await;
                    send_state(&state_for_events, game_id, player_id, &tx_for_events).await;
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    // Handle incoming messages from the client
    let state_for_recv = state.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(client_msg) => {
                        if let Err(e) =
                            handle_client_message(client_msg, &state_for_recv, game_id, player_id, &tx)
                                .await
                        {
                            tracing::debug!("Command rejected in game {}: {}", game_id, e);
                            let error_msg = ServerMessage::Error {
                                kind: e.kind().to_string(),
                                message: e.to_string(),
                            };
                            let _ = tx.send(error_msg).await;
                        }
                    }
                    Err(e) => {
                        tracing::error!("Failed to parse message: {}", e);
                        let error_msg = ServerMessage::Error {
                            kind: "invalid_message".to_string(),
                            message: format!("Invalid message format: {}", e),
                        };
                        let _ = tx.send(error_msg).await;
                    }
                },
                Message::Close(_) => {
                    tracing::info!("Client disconnected from game {} ({:?})", game_id, player_id);
                    break;
                }
                _ => {}
            }
        }
    });

    // Wait for any task to finish
    tokio::select! {
        _ = (&mut send_task) => {
            recv_task.abort();
            event_task.abort();
        }
        _ = (&mut recv_task) => {
            send_task.abort();
            event_task.abort();
        }
        _ = (&mut event_task) => {
            send_task.abort();
            recv_task.abort();
        }
    }

    tracing::info!(
        "WebSocket connection closed for game {} ({:?})",
        game_id,
        player_id
    );
}

async fn send_state(
    state: &AppState,
    game_id: Uuid,
    player_id: Option<Uuid>,
    tx: &mpsc::Sender<ServerMessage>,
) {
    match state.service.session_view(game_id, player_id).await {
        Ok(view) => {
            let _ = tx.send(ServerMessage::State(view)).await;
        }
        Err(e) => {
            tracing::warn!("Could not load state for game {}: {}", game_id, e);
            let _ = tx
                .send(ServerMessage::Error {
                    kind: e.kind().to_string(),
                    message: e.to_string(),
                })
                .await;
        }
    }
}

/// Handle individual client messages. Results reach every client through
/// the event stream, so only failures are answered directly.
async fn handle_client_message(
    msg: ClientMessage,
    state: &AppState,
    game_id: Uuid,
    player_id: Option<Uuid>,
    tx: &mpsc::Sender<ServerMessage>,
) -> Result<(), ServiceError> {
    if msg == ClientMessage::RequestState {
        send_state(state, game_id, player_id, tx).await;
        return Ok(());
    }

    let player_id = player_id.ok_or(ServiceError::BadRequest(
        "a player id is required to send commands",
    ))?;

    match msg {
        ClientMessage::StartGame => {
            state.service.start_game(game_id, player_id).await?;
        }
        ClientMessage::GiveHint { word, count } => {
            state
                .service
                .give_hint(game_id, player_id, &word, count)
                .await?;
        }
        ClientMessage::RevealCard { card_id } => {
            state
                .service
                .reveal_card(game_id, player_id, card_id)
                .await?;
        }
        ClientMessage::PassTurn => {
            state.service.pass_turn(game_id, player_id).await?;
        }
        ClientMessage::RequestAutomatedHint => {
            state
                .service
                .request_automated_hint(game_id, player_id)
                .await?;
        }
        ClientMessage::RequestState => {}
    }

    Ok(())
}
