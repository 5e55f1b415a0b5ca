/// Clock store abstraction and its in-memory backend.
pub mod clock_store;
/// Persisted timer record shape.
pub mod models;
/// Storage error type and call deadlines.
pub mod storage;
