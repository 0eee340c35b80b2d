//! WebSocket upgrade handler and per-connection session

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, warn};

use crate::app::AppState;
use crate::game::{PlayerId, SessionCommand};
use crate::util::rate_limit::PlayerRateLimiter;
use crate::ws::protocol::{ClientMsg, ServerMsg};

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle the upgraded WebSocket connection: admission, identity ack,
/// then the read/write session until disconnect.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut ws_sink, ws_stream) = socket.split();

    // Ask the session task for a player slot
    let (reply_tx, reply_rx) = tokio::sync::oneshot::channel();
    if state
        .session
        .command_tx
        .send(SessionCommand::Join { reply: reply_tx })
        .await
        .is_err()
    {
        error!("Session task is gone, dropping connection");
        return;
    }

    let player_id = match reply_rx.await {
        Ok(Ok(player_id)) => player_id,
        Ok(Err(err)) => {
            // Capacity rejection is reported to this connection only,
            // then the connection closes
            let _ = send_msg(
                &mut ws_sink,
                &ServerMsg::Error {
                    message: err.to_string(),
                },
            )
            .await;
            return;
        }
        Err(_) => return,
    };

    // Subscribe before the ack so no snapshot between admission and the
    // first read is missed
    let snapshot_rx = state.session.subscribe();

    if send_msg(&mut ws_sink, &ServerMsg::PlayerId { player_id })
        .await
        .is_err()
    {
        let _ = state
            .session
            .command_tx
            .send(SessionCommand::Leave { player_id })
            .await;
        return;
    }

    info!(player_id, "New WebSocket connection");

    run_session(
        player_id,
        ws_sink,
        ws_stream,
        state.session.command_tx.clone(),
        snapshot_rx,
    )
    .await;

    // Cleanup on disconnect; bullets the player owns keep flying
    let _ = state
        .session
        .command_tx
        .send(SessionCommand::Leave { player_id })
        .await;

    info!(player_id, "WebSocket connection closed");
}

/// Run the WebSocket session with read/write split
async fn run_session(
    player_id: PlayerId,
    mut ws_sink: futures::stream::SplitSink<WebSocket, Message>,
    mut ws_stream: futures::stream::SplitStream<WebSocket>,
    command_tx: mpsc::Sender<SessionCommand>,
    mut snapshot_rx: broadcast::Receiver<ServerMsg>,
) {
    let rate_limiter = PlayerRateLimiter::new();

    // Writer task: snapshot broadcast -> WebSocket. A failure here is
    // isolated to this connection.
    let writer_handle = tokio::spawn(async move {
        loop {
            match snapshot_rx.recv().await {
                Ok(msg) => {
                    if let Err(e) = send_msg(&mut ws_sink, &msg).await {
                        debug!(player_id, error = %e, "WebSocket send failed");
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(player_id, lagged_count = n, "Client lagged, skipping {} snapshots", n);
                    // Continue - don't disconnect for lag
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!(player_id, "Snapshot channel closed");
                    break;
                }
            }
        }
    });

    // Reader loop: WebSocket -> session task
    while let Some(result) = ws_stream.next().await {
        match result {
            Ok(Message::Text(text)) => {
                if !rate_limiter.check_input() {
                    warn!(player_id, "Rate limited input message");
                    continue;
                }

                // Unknown types and malformed payloads are dropped
                // per-message; the connection stays open
                match serde_json::from_str::<ClientMsg>(&text) {
                    Ok(ClientMsg::Input { inputs }) => {
                        if command_tx
                            .send(SessionCommand::Input {
                                player_id,
                                intent: inputs,
                            })
                            .await
                            .is_err()
                        {
                            debug!(player_id, "Command channel closed");
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(player_id, error = %e, "Ignoring unparseable client message");
                    }
                }
            }
            Ok(Message::Binary(_)) => {
                warn!(player_id, "Received binary message, ignoring");
            }
            Ok(Message::Ping(_)) => {
                debug!(player_id, "Received ping");
            }
            Ok(Message::Pong(_)) => {
                debug!(player_id, "Received pong");
            }
            Ok(Message::Close(_)) => {
                info!(player_id, "Client initiated close");
                break;
            }
            Err(e) => {
                error!(player_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    writer_handle.abort();
}

/// Send a message over WebSocket
async fn send_msg(
    sink: &mut futures::stream::SplitSink<WebSocket, Message>,
    msg: &ServerMsg,
) -> Result<(), String> {
    let json = serde_json::to_string(msg).map_err(|e| e.to_string())?;
    sink.send(Message::Text(json))
        .await
        .map_err(|e| e.to_string())
}
