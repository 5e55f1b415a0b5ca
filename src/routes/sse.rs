use std::convert::Infallible;

use axum::{
    Router,
    extract::{Path, State},
    response::sse::Sse,
    routing::get,
};
use futures::Stream;

use crate::{
    error::AppError,
    services::sse_service,
    state::{SharedState, timer::TimerId},
};

#[utoipa::path(
    get,
    path = "/sse/timers/{id}",
    tag = "observers",
    params(("id" = String, Path, description = "Timer identifier")),
    responses((status = 200, description = "Timer update stream", content_type = "text/event-stream", body = String))
)]
/// Stream realtime updates for one timer.
pub async fn timer_stream(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>>, AppError> {
    let id = TimerId::parse(id)?;
    Ok(sse_service::subscribe_timer(state, id).await)
}

/// Configure the SSE endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/sse/timers/{id}", get(timer_stream))
}
