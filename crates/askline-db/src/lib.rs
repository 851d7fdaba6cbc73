//! Database layer for the Askline forum.
//!
//! Provides SQLite connection pooling (via `r2d2`), WAL-mode initialization,
//! and embedded SQL migrations. Users, questions, and answers all live in
//! tables created by the versioned migrations in this crate.
//!
//! SQL files are compiled into the binary via `include_str!`, so a server
//! build always ships with the schema its queries expect.

mod migrations;
mod pool;

pub use migrations::{run_migrations, MigrationError};
pub use pool::{create_pool, DbPool, DbRuntimeSettings, PoolError};
