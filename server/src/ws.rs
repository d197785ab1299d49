use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use tracing::{info, warn};
use tricktaker_protocol::{ClientToServer, ErrorKind, ServerToClient};

use crate::broadcast::send_to;
use crate::handlers::{self, Connection};
use crate::AppState;

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();

    let (tx_out, mut rx_out) = tokio::sync::mpsc::unbounded_channel::<ServerToClient>();

    tokio::spawn(async move {
        while let Some(msg) = rx_out.recv().await {
            let text = match serde_json::to_string(&msg) {
                Ok(t) => t,
                Err(e) => {
                    warn!(error = %e, "dropping unserializable message");
                    continue;
                }
            };
            if sender.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    let mut conn = Connection::new(uuid::Uuid::new_v4(), tx_out);
    info!(conn = %conn.id, "connection opened");
    send_to(&conn.tx, ServerToClient::Hello { your_id: conn.id });

    while let Some(Ok(msg)) = receiver.next().await {
        match msg {
            Message::Text(t) => match serde_json::from_str::<ClientToServer>(&t) {
                Ok(cmd) => handlers::route_cmd(cmd, &state, &mut conn),
                Err(e) => send_to(
                    &conn.tx,
                    ServerToClient::Error {
                        kind: ErrorKind::MalformedMessage,
                        message: format!("bad json: {e}"),
                    },
                ),
            },
            Message::Close(_) => break,
            _ => {}
        }
    }

    handlers::disconnect(&state, &conn);
    info!(conn = %conn.id, "connection closed");
}
