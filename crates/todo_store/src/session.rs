//! Caller-owned session state for the session backend.

use entities::TodoList;
use serde::{Deserialize, Serialize};

use crate::{IdGenerator, TodoStoreResult};

const SEED_DATA: &str = include_str!("seed_data.json");

/// Per-visitor session context owned by the web layer.
///
/// The session backend keeps its whole dataset in `todo_lists`, creating it
/// from the seed data on first use. The value serializes so the caller can
/// persist it with whatever session mechanism it uses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    /// Signed-in username, if any.
    #[serde(default)]
    pub username: Option<String>,
    /// Whether the visitor has authenticated.
    #[serde(default)]
    pub signed_in: bool,
    /// Todo data held by the session backend.
    #[serde(default, rename = "todoLists")]
    pub todo_lists: Option<SessionTodoLists>,
}

impl Session {
    /// Creates an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session already signed in as `username`.
    pub fn signed_in_as(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            signed_in: true,
            todo_lists: None,
        }
    }

    /// Returns the session's todo data, seeding it if absent.
    pub fn todo_lists_mut(&mut self) -> TodoStoreResult<&mut SessionTodoLists> {
        let data = match self.todo_lists.take() {
            Some(data) => data,
            None => {
                let seeded = SessionTodoLists::seeded()?;
                tracing::debug!(lists = seeded.lists.len(), "Seeded session todo lists");
                seeded
            }
        };
        Ok(self.todo_lists.insert(data))
    }
}

/// The todo lists of one session together with the session's ID counter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTodoLists {
    /// Lists in insertion order.
    pub lists: Vec<TodoList>,
    /// Source of IDs for new lists and todos.
    pub ids: IdGenerator,
}

impl SessionTodoLists {
    /// Builds the dataset from explicit lists.
    pub fn new(lists: Vec<TodoList>) -> Self {
        let ids = IdGenerator::after(&lists);
        Self { lists, ids }
    }

    /// Builds the dataset from the embedded seed data.
    pub fn seeded() -> TodoStoreResult<Self> {
        let lists: Vec<TodoList> = serde_json::from_str(SEED_DATA)?;
        Ok(Self::new(lists))
    }
}
