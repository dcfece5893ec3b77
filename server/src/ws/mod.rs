// WebSocket session gateway for phone motion producers.
// Invariants: one slot per socket, assigned on connect and released on
// close; samples are forwarded in arrival order.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State as AxumState;
use axum::response::IntoResponse;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::app::AppState;
use crate::motion::{submit_motion, MotionInput};
use crate::utils::now_epoch_ms;

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum GatewayRequest {
    Motion(MotionInput),
}

#[derive(Serialize)]
struct AssignedMessage {
    #[serde(rename = "type")]
    message_type: &'static str,
    slot: u8,
}

#[derive(Serialize)]
struct ErrorMessage {
    #[serde(rename = "type")]
    message_type: &'static str,
    message: String,
}

pub async fn ws_handler(
    AxumState(app_state): AxumState<AppState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, app_state))
}

async fn handle_socket(mut socket: WebSocket, app_state: AppState) {
    let assigned = {
        let mut hub = app_state.hub.write().await;
        hub.slots.assign(now_epoch_ms())
    };

    let slot = match assigned {
        Ok(slot) => slot,
        Err(err) => {
            info!("session rejected: {err}");
            let rejection = ErrorMessage {
                message_type: "error",
                message: err.to_string(),
            };
            if let Ok(payload) = serde_json::to_string(&rejection) {
                let _ = socket.send(Message::Text(payload)).await;
            }
            return;
        }
    };

    info!(slot, "session assigned");
    let hello = AssignedMessage {
        message_type: "assigned",
        slot,
    };
    if let Ok(payload) = serde_json::to_string(&hello) {
        if socket.send(Message::Text(payload)).await.is_err() {
            app_state.hub.write().await.slots.release(slot);
            return;
        }
    }

    while let Some(inbound) = socket.next().await {
        match inbound {
            Ok(Message::Text(payload)) => match serde_json::from_str::<GatewayRequest>(&payload) {
                Ok(GatewayRequest::Motion(input)) => {
                    if let Err(err) = submit_motion(&app_state, slot, input).await {
                        warn!(slot, "motion dropped: {err}");
                    }
                }
                Err(err) => {
                    warn!(slot, ?err, "unrecognized gateway message");
                }
            },
            Ok(Message::Ping(payload)) => {
                if socket.send(Message::Pong(payload)).await.is_err() {
                    break;
                }
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(err) => {
                warn!(slot, ?err, "ws error");
                break;
            }
        }
    }

    app_state.hub.write().await.slots.release(slot);
    info!(slot, "session released");
}
