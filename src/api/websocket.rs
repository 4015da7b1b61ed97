use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::state::{AppState, WsEvent};

#[derive(Debug, Deserialize)]
struct WsIncoming {
    #[serde(rename = "type")]
    msg_type: String,
}

#[derive(Debug, Default, Serialize)]
struct WsOutgoing {
    #[serde(rename = "type")]
    msg_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    command: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    frame_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl From<WsEvent> for WsOutgoing {
    fn from(event: WsEvent) -> Self {
        match event {
            WsEvent::RecordedCommand {
                session_id,
                command,
            } => WsOutgoing {
                msg_type: "recorded_command".to_string(),
                session_id: Some(session_id),
                command: Some(serde_json::to_value(&command).unwrap_or_default()),
                ..Default::default()
            },
            WsEvent::FrameRemoved { session_id } => WsOutgoing {
                msg_type: "frame_removed".to_string(),
                session_id: Some(session_id),
                ..Default::default()
            },
            WsEvent::ContextMenu { session_id } => WsOutgoing {
                msg_type: "context_menu".to_string(),
                session_id: Some(session_id),
                ..Default::default()
            },
            WsEvent::FrameLocation {
                session_id,
                frame_location,
            } => WsOutgoing {
                msg_type: "frame_location".to_string(),
                session_id: Some(session_id),
                frame_location: Some(frame_location.to_string()),
                ..Default::default()
            },
            WsEvent::Error { session_id, error } => WsOutgoing {
                msg_type: "error".to_string(),
                session_id: Some(session_id),
                error: Some(error),
                ..Default::default()
            },
            WsEvent::Pong => WsOutgoing {
                msg_type: "pong".to_string(),
                ..Default::default()
            },
        }
    }
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(client_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    tracing::info!("WebSocket connection request from client: {}", client_id);
    ws.on_upgrade(move |socket| handle_socket(socket, client_id, state))
}

async fn handle_socket(socket: WebSocket, client_id: String, state: Arc<AppState>) {
    state.client_connected(&client_id);

    let (mut sender, mut receiver) = socket.split();

    // Subscribe to broadcast events
    let mut rx = state.subscribe();

    // Task to forward broadcast events to this client
    let send_task = tokio::spawn(async move {
        while let Ok(event) = rx.recv().await {
            let json = match serde_json::to_string(&WsOutgoing::from(event)) {
                Ok(j) => j,
                Err(_) => continue,
            };

            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    // Task to handle incoming messages (ping/pong)
    let state_clone = state.clone();
    let recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            if let Message::Text(text) = msg {
                if let Ok(incoming) = serde_json::from_str::<WsIncoming>(&text) {
                    if incoming.msg_type == "ping" {
                        state_clone.broadcast(WsEvent::Pong);
                    }
                }
            }
        }
    });

    // Wait for either task to complete
    tokio::select! {
        _ = send_task => {},
        _ = recv_task => {},
    }

    state.client_disconnected(&client_id);
}
