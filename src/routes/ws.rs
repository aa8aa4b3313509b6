// WebSocket push of store snapshots

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use bytes::Bytes;
use tokio::sync::watch;
use tokio::time::{Duration, timeout};

use super::ApiState;
use crate::store::AppState;

pub(super) const WS_PING_INTERVAL: Duration = Duration::from_secs(30);
pub(super) const WS_SEND_TIMEOUT: Duration = Duration::from_secs(10);

pub(super) async fn ws_state(
    ws: WebSocketUpgrade,
    State(state): State<ApiState>,
) -> impl IntoResponse {
    let store = state.dashboard.store().clone();
    let rx = store.subscribe();
    ws.on_upgrade(move |socket| async move {
        if let Err(e) = stream_state(socket, rx).await {
            tracing::info!("State stream error: {}", e);
        }
        tracing::debug!(subscribers = store.subscriber_count(), "state stream closed");
    })
}

/// Sends the current snapshot, then one per store change. Intermediate
/// snapshots are coalesced when the client is slower than the store.
async fn stream_state(
    mut socket: WebSocket,
    mut rx: watch::Receiver<AppState>,
) -> anyhow::Result<()> {
    tracing::info!("Client connected to state stream");
    let mut ping_interval = tokio::time::interval(WS_PING_INTERVAL);
    ping_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    // First tick completes immediately; skip it so the first frame is the snapshot.
    ping_interval.tick().await;

    let json = serde_json::to_string(&*rx.borrow_and_update())?;
    if !send(&mut socket, Message::Text(json.into())).await {
        return Ok(());
    }

    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let json = serde_json::to_string(&*rx.borrow_and_update())?;
                if !send(&mut socket, Message::Text(json.into())).await {
                    break;
                }
            }
            incoming = socket.recv() => match incoming {
                None | Some(Err(_)) | Some(Ok(Message::Close(_))) => break,
                // Pongs and client chatter carry nothing for this stream.
                Some(Ok(_)) => {}
            },
            _ = ping_interval.tick() => {
                if !send(&mut socket, Message::Ping(Bytes::new())).await {
                    break;
                }
            }
        }
    }
    tracing::info!("Client disconnected from state stream");
    Ok(())
}

/// False when the client is gone or did not accept the frame within the timeout.
async fn send(socket: &mut WebSocket, msg: Message) -> bool {
    matches!(timeout(WS_SEND_TIMEOUT, socket.send(msg)).await, Ok(Ok(())))
}
