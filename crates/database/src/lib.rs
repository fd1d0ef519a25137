//! # Database Crate
//!
//! This crate is the only place that talks SQL. It owns the connection pool,
//! the statistics reads used by the HTTP endpoints, and the bootstrap step that
//! creates and seeds the tables.
//!
//! ## Architectural Principles
//!
//! - **Process-scoped pool:** `connect` builds one `Database` at startup; it is
//!   passed explicitly to whoever needs it, never stored in a global.
//! - **One session per request:** `Database::acquire_session` checks out a
//!   pooled connection that returns to the pool when dropped.
//! - **Tolerant raw reads:** the externally loaded `distribuicao` table is read
//!   through ordered lists of query variants (`raw_distribution`) consumed by a
//!   single "first success wins" combinator (`fallback`).
//!
//! ## Public API
//!
//! - `connect` / `Database` / `PgSession`: the connection manager.
//! - `StatsSource` / `StatsSession`: the read interface the web server uses.
//! - `fallback::{first_success, fetch_optional, fetch_all, Attempt, QueryCandidate}`.
//! - `bootstrap`: migrations plus idempotent sample data.
//! - `DbError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod bootstrap;
pub mod connection;
pub mod error;
pub mod fallback;
pub mod raw_distribution;
pub mod repository;
pub mod source;

// Re-export the key components to create a clean, public-facing API.
pub use bootstrap::{SeedReport, bootstrap};
pub use connection::{Database, PgSession, connect, run_migrations};
pub use error::DbError;
pub use fallback::{Attempt, QueryCandidate, SqlParam};
pub use source::{StatsSession, StatsSource};
