//! Relational todo stores.
//!
//! Two drivers implement [`crate::TodoStore`] over the same schema:
//! [`PgTodoStore`] for multi-user deployments and [`SqliteTodoStore`] for
//! single-user mode and tests. Both are bound to one username and filter
//! every statement by it. Results are ordered with [`crate::ordering`]
//! rather than by SQL collation, so both drivers and the session store agree.

mod postgres;
mod rows;
mod schema;
mod sqlite;

pub use postgres::PgTodoStore;
pub use schema::{POSTGRES_SCHEMA, SQLITE_SCHEMA};
pub use sqlite::SqliteTodoStore;

/// Logs a statement and its bound parameters before it is executed.
fn log_statement(statement: &str, params: &[&dyn std::fmt::Debug]) {
    tracing::debug!(statement, ?params, "Executing statement");
}
