/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Server-Sent Events observer streams.
pub mod sse_service;
/// Background purge of expired clock store entries.
pub mod store_sweeper;
/// Timer commands, queries and subscriptions.
pub mod timer_service;
/// WebSocket observer connection handling.
pub mod websocket_service;
