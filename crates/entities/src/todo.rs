//! Todo list and todo entity definitions.

use serde::{Deserialize, Serialize};

/// Identifier of a todo list, unique per user.
pub type TodoListId = i32;

/// Identifier of a todo, unique within its list.
pub type TodoId = i32;

/// A titled task with a completion flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Unique identifier.
    pub id: TodoId,
    /// Task title.
    pub title: String,
    /// Whether the task is completed.
    pub done: bool,
    /// Owning todo list ID.
    pub todo_list_id: TodoListId,
}

impl Todo {
    /// Creates a new, not yet completed todo.
    pub fn new(id: TodoId, title: impl Into<String>, todo_list_id: TodoListId) -> Self {
        Self {
            id,
            title: title.into(),
            done: false,
            todo_list_id,
        }
    }

    /// Sets the done flag.
    pub fn with_done(mut self, done: bool) -> Self {
        self.done = done;
        self
    }
}

/// A named, user-owned collection of todos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoList {
    /// Unique identifier.
    pub id: TodoListId,
    /// List title, unique per user.
    pub title: String,
    /// Todos in this list, in storage order.
    #[serde(default)]
    pub todos: Vec<Todo>,
}

impl TodoList {
    /// Creates a new empty todo list.
    pub fn new(id: TodoListId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            todos: Vec::new(),
        }
    }

    /// Sets the todos.
    pub fn with_todos(mut self, todos: Vec<Todo>) -> Self {
        self.todos = todos;
        self
    }

    /// Returns true if the list has at least one todo and all of them are done.
    ///
    /// An empty list is never done.
    pub fn is_done(&self) -> bool {
        !self.todos.is_empty() && self.todos.iter().all(|todo| todo.done)
    }

    /// Returns true if any todo in the list is not done.
    pub fn has_undone_todos(&self) -> bool {
        self.todos.iter().any(|todo| !todo.done)
    }

    /// Finds a todo by ID.
    pub fn todo(&self, id: TodoId) -> Option<&Todo> {
        self.todos.iter().find(|todo| todo.id == id)
    }

    /// Finds a todo by ID for mutation.
    pub fn todo_mut(&mut self, id: TodoId) -> Option<&mut Todo> {
        self.todos.iter_mut().find(|todo| todo.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_list_is_not_done() {
        let list = TodoList::new(1, "Groceries");

        assert!(!list.is_done());
        assert!(!list.has_undone_todos());
    }

    #[test]
    fn test_list_done_only_when_all_todos_done() {
        let mut list = TodoList::new(1, "Groceries").with_todos(vec![
            Todo::new(2, "Milk", 1).with_done(true),
            Todo::new(3, "Bread", 1),
        ]);
        assert!(!list.is_done());
        assert!(list.has_undone_todos());

        list.todo_mut(3).unwrap().done = true;
        assert!(list.is_done());
        assert!(!list.has_undone_todos());
    }

    #[test]
    fn test_todo_lookup() {
        let list = TodoList::new(1, "Work").with_todos(vec![Todo::new(7, "Email", 1)]);

        assert_eq!(list.todo(7).map(|t| t.title.as_str()), Some("Email"));
        assert!(list.todo(8).is_none());
    }

    #[test]
    fn test_list_deserializes_without_todos() {
        let list: TodoList = serde_json::from_str(r#"{"id": 4, "title": "Empty"}"#).unwrap();

        assert_eq!(list.id, 4);
        assert!(list.todos.is_empty());
    }
}
