//! Persistence layer: durable PostgreSQL mirror of the issue store.
//!
//! Issues, their update trails, and votes are written through on every
//! mutation and loaded back into the in-memory store at startup. The
//! concrete implementation uses `sqlx::PgPool` for async PostgreSQL
//! access; schema migrations live under `migrations/`.

pub mod models;
pub mod postgres;

pub use postgres::PostgresPersistence;
