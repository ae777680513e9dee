//! Todo store trait definition.

use async_trait::async_trait;
use entities::{Todo, TodoId, TodoList, TodoListId};

use crate::TodoStoreResult;

/// Per-user todo persistence.
///
/// A store is bound to one user when it is constructed and every operation is
/// scoped to that user. Entities that are missing or owned by someone else are
/// reported as `false` or `None`, never as an error. Mutations take
/// `&mut self` so a session-backed store cannot be written through two
/// handles at once.
#[async_trait]
pub trait TodoStore: Send + Sync {
    // =========================================================================
    // Reads
    // =========================================================================

    /// Lists all todo lists with their todos, undone lists first, each group
    /// ordered by case-insensitive title.
    async fn sorted_todo_lists(&self) -> TodoStoreResult<Vec<TodoList>>;

    /// Returns the todos of a loaded list, undone first, each group ordered by
    /// case-insensitive title.
    async fn sorted_todos(&self, todo_list: &TodoList) -> TodoStoreResult<Vec<Todo>>;

    /// Gets a todo list with its todos.
    async fn load_todo_list(&self, todo_list_id: TodoListId) -> TodoStoreResult<Option<TodoList>>;

    /// Gets a todo from a list.
    async fn load_todo(
        &self,
        todo_list_id: TodoListId,
        todo_id: TodoId,
    ) -> TodoStoreResult<Option<Todo>>;

    /// Returns true if the user has a list with exactly this title.
    async fn exists_todo_list_title(&self, title: &str) -> TodoStoreResult<bool>;

    /// Checks a username and plaintext password against the stored hash.
    async fn authenticate(&self, username: &str, password: &str) -> TodoStoreResult<bool>;

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Flips a todo between done and not done.
    async fn toggle_done_todo(
        &mut self,
        todo_list_id: TodoListId,
        todo_id: TodoId,
    ) -> TodoStoreResult<bool>;

    /// Deletes a todo from a list.
    async fn delete_todo(&mut self, todo_list_id: TodoListId, todo_id: TodoId)
        -> TodoStoreResult<bool>;

    /// Deletes a todo list together with its todos.
    async fn delete_todo_list(&mut self, todo_list_id: TodoListId) -> TodoStoreResult<bool>;

    /// Marks every todo in a list as done.
    ///
    /// Returns true whenever the list exists, including when every todo was
    /// already done.
    async fn complete_all_todos(&mut self, todo_list_id: TodoListId) -> TodoStoreResult<bool>;

    /// Adds a new, not yet done todo to a list.
    async fn create_todo(&mut self, title: &str, todo_list_id: TodoListId)
        -> TodoStoreResult<bool>;

    /// Renames a todo list.
    ///
    /// Fails with [`crate::TodoStoreError::DuplicateTitle`] if another list of
    /// the user already has `new_title`.
    async fn edit_todo_list(
        &mut self,
        new_title: &str,
        todo_list_id: TodoListId,
    ) -> TodoStoreResult<bool>;

    /// Creates an empty todo list.
    ///
    /// Returns false if the user already has a list with this title.
    async fn create_todo_list(&mut self, title: &str) -> TodoStoreResult<bool>;

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Returns true if the list has at least one todo and all are done.
    fn is_done_todo_list(&self, todo_list: &TodoList) -> bool {
        todo_list.is_done()
    }

    /// Returns true if any todo in the list is not done.
    fn has_undone_todos(&self, todo_list: &TodoList) -> bool {
        todo_list.has_undone_todos()
    }
}
