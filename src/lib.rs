//! Library crate for match-clock-back, exposing modules for binaries and integration tests.

/// Runtime configuration.
pub mod config;
/// Clock store access.
pub mod dao;
/// Wire payloads.
pub mod dto;
mod error;
/// HTTP, WebSocket and SSE routes.
pub mod routes;
/// Service layer between routes and state.
pub mod services;
/// Timer engine, observers and tick tasks.
pub mod state;
