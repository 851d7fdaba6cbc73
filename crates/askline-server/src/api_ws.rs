//! `GET /ws`: the push channel.
//!
//! Each connection gets a [`Channel`] registered with the live registry. A
//! writer task drains the channel's queue into the socket; the read side only
//! watches for close or error, since clients send nothing the server acts on.

use askline_live::Channel;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        ConnectInfo, Extension,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;

use crate::AppState;

/// WebSocket handler: `GET /ws`.
pub async fn ws_handler(
    Extension(state): Extension<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, addr))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, addr: SocketAddr) {
    let (mut sender, mut receiver) = socket.split();

    let (channel, mut rx) = Channel::open();
    let channel_id = channel.id();
    let registry = state.broadcaster.registry();
    registry.register(channel.clone()).await;
    tracing::debug!(channel_id = %channel_id, remote_addr = %addr, "websocket connected");

    // Ends once the channel is closed and drained, or the socket rejects a write.
    let mut send_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sender.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
        let _ = sender.close().await;
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) | Err(_) => break,
                // Push-only: inbound frames are ignored.
                Ok(_) => {}
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    registry.unregister(&channel).await;
    tracing::debug!(channel_id = %channel_id, remote_addr = %addr, "websocket disconnected");
}
