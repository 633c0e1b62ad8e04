use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::broadcast;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{models::PlayerEvent, state::AppState};

#[derive(Deserialize)]
pub struct WsQuery {
    /// Only forward events for this playback session.
    pub session: Option<Uuid>,
}

/// GET /ws: player surface event stream
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
    State(state): State<AppState>,
) -> Response {
    let rx = state.events.subscribe();
    ws.on_upgrade(move |socket| handle_socket(socket, rx, query.session))
}

fn session_of(event: &PlayerEvent) -> Uuid {
    match event {
        PlayerEvent::Loading { session_id, .. }
        | PlayerEvent::Apply { session_id, .. }
        | PlayerEvent::AwaitingSelection { session_id, .. }
        | PlayerEvent::NoStream { session_id, .. } => *session_id,
    }
}

async fn handle_socket(
    socket: WebSocket,
    mut rx: broadcast::Receiver<PlayerEvent>,
    session: Option<Uuid>,
) {
    let (mut sink, mut stream) = socket.split();

    // Task: forward broadcast events → player
    let send_task = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if session.is_some_and(|id| id != session_of(&event)) {
                        continue;
                    }
                    let json = match serde_json::to_string(&event) {
                        Ok(j) => j,
                        Err(e) => {
                            warn!("WS serialise error: {e}");
                            continue;
                        }
                    };
                    if sink.send(Message::Text(json.into())).await.is_err() {
                        break; // player disconnected
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("WS subscriber lagged by {n} messages");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    // Player → server traffic goes through the REST API; drain until close.
    while let Some(msg) = stream.next().await {
        match msg {
            Ok(Message::Close(_)) | Err(_) => break,
            Ok(m) => {
                debug!("WS recv (ignored): {m:?}");
            }
        }
    }

    send_task.abort();
}
