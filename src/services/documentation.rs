use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Match Clock Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::timer::get_display,
        crate::routes::timer::get_state,
        crate::routes::timer::start_timer,
        crate::routes::timer::stop_timer,
        crate::routes::timer::reset_timer,
        crate::routes::sse::timer_stream,
        crate::routes::websocket::ws_handler,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::timer::TimerUpdate,
            crate::dto::timer::TimerRecordResponse,
            crate::state::timer::RunState,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "timer", description = "Countdown commands and queries"),
        (name = "observers", description = "Real-time timer update streams"),
    )
)]
pub struct ApiDoc;
