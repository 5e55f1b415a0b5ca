use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{info, warn};

use crate::{
    dto::timer::TimerUpdate,
    services::timer_service,
    state::{SharedState, timer::TimerId},
};

/// SSE event name carrying a [`TimerUpdate`].
pub const EVENT_TIMER_UPDATE: &str = "timerUpdate";

/// Register an SSE observer for `id`, seed it with the current state and
/// stream every later update until the client disconnects.
pub async fn subscribe_timer(
    state: SharedState,
    id: TimerId,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (observer, mut updates) = state.dispatcher().connect();
    timer_service::subscribe(&state, observer, &id).await;
    info!(observer = %observer, timer_id = %id, "SSE observer connected");

    // small bounded channel between forwarder and response
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = tx.closed() => break,
                _ = state.shutdown().cancelled() => break,
                update = updates.recv() => {
                    let Some(update) = update else { break };
                    let Some(event) = to_event(&update) else { continue };
                    if tx.send(Ok(event)).await.is_err() {
                        break;
                    }
                }
            }
        }

        // Own the shared state inside the task so cleanup runs after the request is gone.
        state.dispatcher().disconnect(observer);
        info!(observer = %observer, timer_id = %id, "SSE observer disconnected");
    });

    // response stream reads from mpsc; when client disconnects axum drops this stream
    let stream = ReceiverStream::new(rx);
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

fn to_event(update: &TimerUpdate) -> Option<Event> {
    match Event::default().event(EVENT_TIMER_UPDATE).json_data(update) {
        Ok(event) => Some(event),
        Err(err) => {
            warn!(error = %err, timer_id = %update.id, "failed to encode SSE timer update");
            None
        }
    }
}
