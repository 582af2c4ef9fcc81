use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use crate::http::AppState;
use crate::protocol::{welcome_msg, AddSphereRequest, ClientMsg, ServerMsg};
use crate::sim_loop::{request, SimBroadcast, SimCommand};
use crate::vec3::Vec3;

/// HTTP handler for WebSocket upgrade
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, app_state))
}

async fn handle_socket(socket: WebSocket, app_state: AppState) {
    let (mut sink, mut stream) = socket.split();

    // Subscribe before the welcome so no snapshot slips between the two
    let mut broadcast_rx = app_state.broadcast_tx.subscribe();

    let welcome = ServerMsg::Welcome(welcome_msg(&app_state.physics));
    let welcome_json = match serde_json::to_string(&welcome) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!("Failed to encode welcome: {}", e);
            return;
        }
    };
    if sink.send(Message::Text(welcome_json.into())).await.is_err() {
        return;
    }

    tracing::info!("State stream client connected");

    loop {
        tokio::select! {
            // Client -> Server
            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientMsg>(&text) {
                            Ok(client_msg) => {
                                if let Some(reply) = handle_client_msg(&app_state, client_msg).await {
                                    let json = match serde_json::to_string(&reply) {
                                        Ok(json) => json,
                                        Err(_) => continue,
                                    };
                                    if sink.send(Message::Text(json.into())).await.is_err() {
                                        break;
                                    }
                                }
                            }
                            Err(e) => tracing::warn!("Ignoring malformed client message: {}", e),
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {} // Ignore ping/pong/binary
                }
            }

            // Server -> Client (broadcast)
            result = broadcast_rx.recv() => {
                match result {
                    Ok(SimBroadcast::State(msg)) => {
                        if let Ok(json) = serde_json::to_string(&ServerMsg::State(msg)) {
                            if sink.send(Message::Text(json.into())).await.is_err() {
                                break;
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!("State stream client lagged by {} messages", n);
                        // Continue - every snapshot is complete, dropping is fine
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    tracing::info!("State stream client disconnected");
}

/// Apply one client request. Only `add_sphere` produces a direct reply.
async fn handle_client_msg(app_state: &AppState, msg: ClientMsg) -> Option<ServerMsg> {
    match msg {
        ClientMsg::AddSphere {
            position,
            velocity,
            radius,
        } => {
            let req = AddSphereRequest {
                position,
                velocity,
                radius,
            };
            if let Err(reason) = req.validate_within(&app_state.bounds) {
                tracing::warn!("Rejected add_sphere over WebSocket: {}", reason);
                return None;
            }
            let id = request(&app_state.sim_tx, |response| SimCommand::AddSphere {
                position: Vec3::from_array(req.position),
                velocity: Vec3::from_array(req.velocity),
                radius: req.radius,
                response,
            })
            .await?;
            Some(ServerMsg::SphereAdded { id })
        }
        ClientMsg::DeleteSphere { id } => {
            request(&app_state.sim_tx, |response| SimCommand::RemoveSphere { id, response }).await;
            None
        }
        ClientMsg::Reset => {
            request(&app_state.sim_tx, |response| SimCommand::Reset { response }).await;
            None
        }
    }
}
