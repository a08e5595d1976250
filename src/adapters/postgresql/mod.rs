//! PostgreSQL store
//!
//! Instructions, schedules and generated batch totals kept in PostgreSQL. The
//! schema lives in `migrations/001_initial_schema.sql`.

pub mod adapter;
pub mod client;
pub mod models;

pub use adapter::PostgreSQLAdapter;
pub use client::PostgreSQLClient;
