//! Command-line front end for the todo store.

mod command;

use std::env;

use entities::User;
use todo_store::{
    BackendKind, PgTodoStore, Session, SessionTodoStore, SqliteTodoStore, StoreConfig,
    UserDirectory,
};

use crate::command::{Command, USAGE};

fn init_tracing(log_level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env if present
    dotenvy::dotenv().ok();

    let config = StoreConfig::from_env()?;
    init_tracing(&config.log_level);

    let args: Vec<String> = env::args().skip(1).collect();
    let command = match Command::parse(&args) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{e}\n\n{USAGE}");
            std::process::exit(2);
        }
    };

    let username = env::var("TODO_USER").unwrap_or_else(|_| "admin".to_string());
    tracing::info!(backend = config.backend.as_str(), %username, "Opening todo store");

    match config.backend {
        BackendKind::Session => {
            let mut users = UserDirectory::new();
            if let Ok(password_hash) = env::var("TODO_USER_PASSWORD_HASH") {
                users.insert(User::new(username.clone(), password_hash));
            }

            let mut session = Session::signed_in_as(username);
            let mut store = SessionTodoStore::new(&mut session)?.with_users(&users);
            command::run(&mut store, command).await
        }
        BackendKind::Sqlite => {
            let pool = config.connect_sqlite().await?;
            SqliteTodoStore::init_schema(&pool).await?;
            let mut store = SqliteTodoStore::new(pool, username);
            command::run(&mut store, command).await
        }
        BackendKind::Postgres => {
            let pool = config.connect_postgres().await?;
            PgTodoStore::init_schema(&pool).await?;
            let mut store = PgTodoStore::new(pool, username);
            command::run(&mut store, command).await
        }
    }
}
