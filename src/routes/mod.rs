use axum::Router;

use crate::state::SharedState;

/// Swagger UI and OpenAPI JSON.
pub mod docs;
/// Health check route.
pub mod health;
/// SSE observer route.
pub mod sse;
/// Timer command and query routes.
pub mod timer;
/// WebSocket observer route.
pub mod websocket;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(sse::router())
        .merge(websocket::router())
        .merge(timer::router())
        .merge(docs::router());

    api_router.with_state(state)
}
