use axum::extract::ws::{Message, WebSocket};
use futures::{Sink, SinkExt, StreamExt};
use serde::Serialize;
use thiserror::Error;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{info, warn};

use crate::{
    dto::{
        timer::TimerUpdate,
        ws::{ObserverInboundMessage, ObserverOutboundMessage},
    },
    error::ServiceError,
    services::timer_service,
    state::{SharedState, subscriptions::ObserverId, timer::TimerId},
};

/// Internal error type for observer message handling.
///
/// Distinct from `ServiceError`, which is used for HTTP responses.
#[derive(Debug, Error)]
enum ObserverError {
    /// Writer channel closed - connection should be terminated immediately.
    #[error("connection closed")]
    ConnectionClosed,
    /// Frame was not a recognised observer message.
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
    /// Message referenced an unusable timer.
    #[error("{0}")]
    Service(#[from] ServiceError),
}

/// Handle the full lifecycle of an observer WebSocket connection.
pub async fn handle_socket(state: SharedState, socket: WebSocket) {
    let (sender, mut receiver) = socket.split();
    let (control_tx, control_rx) = mpsc::unbounded_channel::<Message>();
    let (observer, updates) = state.dispatcher().connect();
    info!(observer = %observer, "observer connected");

    // Dedicated writer task merges acknowledgements and timer pushes onto the socket.
    let writer_task = tokio::spawn(pump_frames(sender, control_rx, updates));

    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Text(text)) => {
                match handle_text(&state, observer, &control_tx, text.as_str()).await {
                    Ok(()) => {}
                    Err(ObserverError::ConnectionClosed) => {
                        info!(observer = %observer, "connection closed while replying, terminating");
                        break;
                    }
                    Err(err) => {
                        warn!(observer = %observer, error = %err, "rejected observer message");
                        let reply = ObserverOutboundMessage::Error {
                            message: err.to_string(),
                        };
                        if send_frame(&control_tx, &reply).is_err() {
                            break;
                        }
                    }
                }
            }
            Ok(Message::Ping(payload)) => {
                let _ = control_tx.send(Message::Pong(payload));
            }
            Ok(Message::Close(frame)) => {
                info!(observer = %observer, "observer closed");
                let _ = control_tx.send(Message::Close(frame));
                break;
            }
            Ok(Message::Binary(_)) => {}
            Ok(Message::Pong(_)) => {}
            Err(err) => {
                warn!(observer = %observer, error = %err, "websocket error");
                break;
            }
        }
    }

    let followed = state.dispatcher().disconnect(observer);
    info!(observer = %observer, timers = followed.len(), "observer disconnected");

    finalize(writer_task, control_tx).await;
}

/// Forward timer pushes and control frames to the socket until the control
/// channel closes.
///
/// Pending pushes go first, so a subscriber sees the current state before the
/// `subscribed` acknowledgement.
async fn pump_frames<S>(
    mut sink: S,
    mut control_rx: mpsc::UnboundedReceiver<Message>,
    mut updates: mpsc::Receiver<TimerUpdate>,
) where
    S: Sink<Message> + Unpin,
{
    let mut updates_open = true;
    loop {
        let message = tokio::select! {
            biased;
            update = updates.recv(), if updates_open => match update {
                Some(update) => match encode(&ObserverOutboundMessage::TimerUpdate(update)) {
                    Some(message) => message,
                    None => continue,
                },
                None => {
                    updates_open = false;
                    continue;
                }
            },
            control = control_rx.recv() => match control {
                Some(message) => message,
                None => break,
            },
        };
        if sink.send(message).await.is_err() {
            break;
        }
    }
}

/// Apply one subscribe/unsubscribe request and queue its acknowledgement.
async fn handle_text(
    state: &SharedState,
    observer: ObserverId,
    control_tx: &mpsc::UnboundedSender<Message>,
    text: &str,
) -> Result<(), ObserverError> {
    match ObserverInboundMessage::from_json_str(text)? {
        ObserverInboundMessage::Subscribe(raw) => {
            let timer_id = TimerId::parse(raw.into_raw()).map_err(ServiceError::from)?;
            timer_service::subscribe(state, observer, &timer_id).await;
            send_frame(control_tx, &ObserverOutboundMessage::Subscribed { timer_id })
        }
        ObserverInboundMessage::Unsubscribe(raw) => {
            let timer_id = TimerId::parse(raw.into_raw()).map_err(ServiceError::from)?;
            timer_service::unsubscribe(state, observer, &timer_id);
            send_frame(control_tx, &ObserverOutboundMessage::Unsubscribed { timer_id })
        }
    }
}

/// Serialize a frame and push it onto the writer channel.
///
/// A serialization failure is logged and swallowed; a closed writer is reported
/// as [`ObserverError::ConnectionClosed`].
fn send_frame<T>(tx: &mpsc::UnboundedSender<Message>, value: &T) -> Result<(), ObserverError>
where
    T: ?Sized + Serialize + std::fmt::Debug,
{
    let Some(message) = encode(value) else {
        return Ok(());
    };
    tx.send(message).map_err(|_| ObserverError::ConnectionClosed)
}

fn encode<T>(value: &T) -> Option<Message>
where
    T: ?Sized + Serialize + std::fmt::Debug,
{
    match serde_json::to_string(value) {
        Ok(payload) => Some(Message::Text(payload.into())),
        Err(err) => {
            warn!(error = %err, "failed to serialize frame `{value:?}`");
            None
        }
    }
}

/// Ensure the writer task winds down before we return from the socket handler.
async fn finalize(writer_task: JoinHandle<()>, control_tx: mpsc::UnboundedSender<Message>) {
    drop(control_tx);
    let _ = writer_task.await;
}
