use axum::extract::ws::{Message, WebSocket};
use futures_util::{stream::SplitSink, SinkExt};
use std::sync::Arc;

/// Write half of a WS connection, shared between the read loop and pushes.
pub type SharedSink = Arc<tokio::sync::Mutex<SplitSink<WebSocket, Message>>>;

/// Serialize any value to JSON and send it over the WS connection.
pub async fn json<T: serde::Serialize>(tx: &SharedSink, payload: &T) -> Result<(), axum::Error> {
    let json = serde_json::to_string(payload).map_err(axum::Error::new)?;
    text(tx, json).await
}

/// Send an already-serialized frame.
pub async fn text(tx: &SharedSink, json: String) -> Result<(), axum::Error> {
    let mut guard = tx.lock().await;
    guard.send(Message::Text(json.into())).await
}
