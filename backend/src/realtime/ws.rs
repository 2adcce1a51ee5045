//! WebSocket endpoint for dashboard clients.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::auth::authenticate_token;
use crate::AppState;

use super::ChannelEvent;

const PING_INTERVAL: Duration = Duration::from_secs(30);

/// Messages clients send to the server.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum ClientMessage {
    JoinAdminRoom { token: String },
}

/// Control frames sent outside the resource event stream.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum ControlMessage {
    AdminRoomJoined,
    Error { message: String },
}

/// WebSocket upgrade handler.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_client(socket, state))
}

/// Handle an individual dashboard connection.
async fn handle_client(socket: WebSocket, state: Arc<AppState>) {
    tracing::info!("Dashboard client connected");

    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut public_rx = state.broadcaster.subscribe_public();
    // Subscribed on join so admin events from before the join are not replayed.
    let mut admin_rx: Option<broadcast::Receiver<ChannelEvent>> = None;
    let mut ping = tokio::time::interval(PING_INTERVAL);

    loop {
        tokio::select! {
            event = public_rx.recv() => {
                if !forward_event(&mut ws_tx, event).await {
                    break;
                }
            }

            event = recv_admin(&mut admin_rx) => {
                if !forward_event(&mut ws_tx, event).await {
                    break;
                }
            }

            _ = ping.tick() => {
                if ws_tx.send(Message::Ping(Vec::new())).await.is_err() {
                    break;
                }
            }

            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if !handle_client_message(&text, &state, &mut ws_tx, &mut admin_rx).await {
                            break;
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if ws_tx.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::warn!("WebSocket error: {}", e);
                        break;
                    }
                }
            }
        }
    }

    tracing::info!("Dashboard client disconnected");
}

/// React to one text frame. Returns false when the socket is done.
async fn handle_client_message<S>(
    text: &str,
    state: &AppState,
    ws_tx: &mut S,
    admin_rx: &mut Option<broadcast::Receiver<ChannelEvent>>,
) -> bool
where
    S: SinkExt<Message> + Unpin,
    S::Error: std::error::Error + Send + Sync + 'static,
{
    match serde_json::from_str::<ClientMessage>(text) {
        Ok(ClientMessage::JoinAdminRoom { token }) => {
            match authenticate_token(state, &token) {
                Ok(admin) => {
                    if admin_rx.is_none() {
                        *admin_rx = Some(state.broadcaster.subscribe_admin());
                    }
                    tracing::info!("{} joined the admin room", admin.email);
                    send_json(ws_tx, &ControlMessage::AdminRoomJoined).await.is_ok()
                }
                Err(_) => {
                    let error = ControlMessage::Error {
                        message: "Not authorized to join the admin room".to_string(),
                    };
                    send_json(ws_tx, &error).await.is_ok()
                }
            }
        }
        Err(_) => {
            let error = ControlMessage::Error {
                message: "Unrecognized message".to_string(),
            };
            send_json(ws_tx, &error).await.is_ok()
        }
    }
}

/// Wait on the admin subscription, or forever before the join.
async fn recv_admin(
    rx: &mut Option<broadcast::Receiver<ChannelEvent>>,
) -> Result<ChannelEvent, broadcast::error::RecvError> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

/// Push one broadcast result out. Returns false when the socket is done.
async fn forward_event<S>(
    sink: &mut S,
    event: Result<ChannelEvent, broadcast::error::RecvError>,
) -> bool
where
    S: SinkExt<Message> + Unpin,
    S::Error: std::error::Error + Send + Sync + 'static,
{
    match event {
        Ok(event) => send_json(sink, &event).await.is_ok(),
        Err(broadcast::error::RecvError::Lagged(skipped)) => {
            tracing::warn!("Slow client dropped {} events", skipped);
            true
        }
        Err(broadcast::error::RecvError::Closed) => false,
    }
}

/// Serialize a message and send it as a text frame.
async fn send_json<S, T>(sink: &mut S, msg: &T) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    S: SinkExt<Message> + Unpin,
    S::Error: std::error::Error + Send + Sync + 'static,
    T: Serialize,
{
    let json = serde_json::to_string(msg)?;
    sink.send(Message::Text(json)).await?;
    Ok(())
}
