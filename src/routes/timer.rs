use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};

use crate::{
    dto::timer::{TimerRecordResponse, TimerUpdate},
    error::AppError,
    services::timer_service,
    state::{SharedState, timer::TimerId},
};

/// Routes handling countdown commands and polling.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/footy/timer/{id}", get(get_display))
        .route("/footy/timer/{id}/state", get(get_state))
        .route("/footy/timer/start/{id}", post(start_timer))
        .route("/footy/timer/stop/{id}", post(stop_timer))
        .route("/footy/timer/reset/{id}", post(reset_timer))
}

/// Poll the remaining time as `M:SS`, creating the timer on first use.
#[utoipa::path(
    get,
    path = "/footy/timer/{id}",
    tag = "timer",
    params(("id" = String, Path, description = "Timer identifier")),
    responses(
        (status = 200, description = "Remaining time", body = String),
        (status = 400, description = "Invalid timer identifier")
    )
)]
pub async fn get_display(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<String>, AppError> {
    let id = TimerId::parse(id)?;
    Ok(Json(timer_service::display(&state, &id).await))
}

/// Current push payload for a timer, without creating it.
#[utoipa::path(
    get,
    path = "/footy/timer/{id}/state",
    tag = "timer",
    params(("id" = String, Path, description = "Timer identifier")),
    responses(
        (status = 200, description = "Current timer state", body = TimerUpdate),
        (status = 404, description = "Timer has no record")
    )
)]
pub async fn get_state(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<TimerUpdate>, AppError> {
    let id = TimerId::parse(id)?;
    let update = timer_service::current_update(&state, &id).await?;
    Ok(Json(update))
}

/// Start or resume a countdown.
#[utoipa::path(
    post,
    path = "/footy/timer/start/{id}",
    tag = "timer",
    params(("id" = String, Path, description = "Timer identifier")),
    responses(
        (status = 200, description = "Timer running", body = TimerRecordResponse),
        (status = 409, description = "Timer already running")
    )
)]
pub async fn start_timer(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<TimerRecordResponse>, AppError> {
    let id = TimerId::parse(id)?;
    let record = timer_service::start(&state, &id).await?;
    Ok(Json(record))
}

/// Pause a running countdown.
#[utoipa::path(
    post,
    path = "/footy/timer/stop/{id}",
    tag = "timer",
    params(("id" = String, Path, description = "Timer identifier")),
    responses(
        (status = 200, description = "Timer paused", body = TimerRecordResponse),
        (status = 409, description = "Timer not started or already paused")
    )
)]
pub async fn stop_timer(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<TimerRecordResponse>, AppError> {
    let id = TimerId::parse(id)?;
    let record = timer_service::stop(&state, &id).await?;
    Ok(Json(record))
}

/// Restore the full duration, paused.
#[utoipa::path(
    post,
    path = "/footy/timer/reset/{id}",
    tag = "timer",
    params(("id" = String, Path, description = "Timer identifier")),
    responses(
        (status = 200, description = "Timer reset", body = TimerRecordResponse)
    )
)]
pub async fn reset_timer(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<TimerRecordResponse>, AppError> {
    let id = TimerId::parse(id)?;
    Ok(Json(timer_service::reset(&state, &id).await))
}
