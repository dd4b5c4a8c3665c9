use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use log::*;
use service::AppState;
use std::sync::Arc;
use tokio::time;
use ws::{ChannelConnection, Connection};

/// Accepts a WebSocket upgrade and subscribes the socket to every broadcast.
/// Clients are not expected to send anything; inbound frames are drained and
/// ignored until the socket closes.
pub(crate) async fn ws_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, app_state))
}

async fn handle_socket(socket: WebSocket, app_state: AppState) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (connection, mut outbound) = ChannelConnection::channel();
    let connection_id = connection.id().clone();
    let write_timeout = app_state.config.ws_write_timeout();
    let hub = Arc::clone(&app_state.ws_hub);

    hub.connect(Arc::new(connection));

    // Dropping the receiver on exit closes the channel, so the next broadcast
    // evicts this connection even before it is unregistered below.
    let writer_id = connection_id.clone();
    let mut writer = tokio::spawn(async move {
        while let Some(text) = outbound.recv().await {
            match time::timeout(write_timeout, ws_tx.send(Message::Text(text.into()))).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    debug!("WebSocket write failed for {writer_id}: {e}");
                    break;
                }
                Err(_) => {
                    warn!("WebSocket write timed out for {writer_id}, closing");
                    break;
                }
            }
        }
        let _ = ws_tx.close().await;
    });

    let reader_id = connection_id.clone();
    let mut reader = tokio::spawn(async move {
        while let Some(frame) = ws_rx.next().await {
            match frame {
                Ok(Message::Close(_)) => break,
                Ok(_) => continue,
                Err(e) => {
                    debug!("WebSocket read error for {reader_id}: {e}");
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut writer => reader.abort(),
        _ = &mut reader => writer.abort(),
    }

    hub.disconnect(&connection_id);
}
