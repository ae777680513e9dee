//! Store configuration.

use std::{env, str::FromStr};

use sqlx::{postgres::PgPoolOptions, sqlite::SqlitePoolOptions, PgPool, SqlitePool};

use crate::{TodoStoreError, TodoStoreResult};

/// Which persistence backend to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// Data held in the caller's session.
    #[default]
    Session,
    /// SQLite database (single-user mode).
    Sqlite,
    /// PostgreSQL database (multi-user mode).
    Postgres,
}

impl BackendKind {
    /// Converts the backend to its configuration string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Session => "session",
            Self::Sqlite => "sqlite",
            Self::Postgres => "postgres",
        }
    }
}

impl FromStr for BackendKind {
    type Err = TodoStoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "session" | "memory" => Ok(Self::Session),
            "sqlite" => Ok(Self::Sqlite),
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            other => Err(TodoStoreError::config(format!("unknown backend: {other}"))),
        }
    }
}

/// Store configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Selected backend.
    pub backend: BackendKind,
    /// Database URL for the relational backends.
    pub database_url: Option<String>,
    /// Maximum pooled connections.
    pub max_connections: u32,
    /// Log level.
    pub log_level: String,
}

impl StoreConfig {
    /// Loads configuration from environment variables.
    pub fn from_env() -> TodoStoreResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> TodoStoreResult<Self> {
        let backend = match lookup("TODO_STORE_BACKEND") {
            Some(value) => value.parse()?,
            None => BackendKind::default(),
        };

        let database_url = match backend {
            BackendKind::Session => lookup("DATABASE_URL"),
            BackendKind::Sqlite => {
                Some(lookup("DATABASE_URL").unwrap_or_else(|| "sqlite::memory:".to_string()))
            }
            BackendKind::Postgres => Some(lookup("DATABASE_URL").ok_or_else(|| {
                TodoStoreError::config("DATABASE_URL is required for the postgres backend")
            })?),
        };

        Ok(Self {
            backend,
            database_url,
            max_connections: lookup("TODO_STORE_MAX_CONNECTIONS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            log_level: lookup("TODO_STORE_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    fn require_database_url(&self) -> TodoStoreResult<&str> {
        self.database_url.as_deref().ok_or_else(|| {
            TodoStoreError::config(format!(
                "DATABASE_URL is required for the {} backend",
                self.backend.as_str()
            ))
        })
    }

    /// Opens a PostgreSQL connection pool.
    pub async fn connect_postgres(&self) -> TodoStoreResult<PgPool> {
        let pool = PgPoolOptions::new()
            .max_connections(self.max_connections)
            .connect(self.require_database_url()?)
            .await?;
        Ok(pool)
    }

    /// Opens a SQLite connection pool.
    ///
    /// An in-memory database is private to one connection, so the pool is
    /// capped at a single connection in that case.
    pub async fn connect_sqlite(&self) -> TodoStoreResult<SqlitePool> {
        let url = self.require_database_url()?;
        let max_connections = if url.contains(":memory:") {
            1
        } else {
            self.max_connections
        };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        Ok(pool)
    }
}
