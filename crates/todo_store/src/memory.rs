//! Session-backed todo store.
//!
//! The dataset lives in the caller's [`Session`]; the store only borrows it.
//! Writes go straight into the borrowed data and are visible to every later
//! store built on the same session. Reads hand out clones so callers can never
//! reach the session's data through a returned value.
//!
//! The borrow is exclusive, so within one task two stores cannot write the same
//! session at once. Callers sharing a session between tasks or requests must
//! serialize access themselves, e.g. by holding a mutex for the duration of
//! one operation.

use async_trait::async_trait;
use entities::{Todo, TodoId, TodoList, TodoListId};

use crate::{
    ordering, Session, SessionTodoLists, TodoStore, TodoStoreError, TodoStoreResult,
    UserDirectory,
};

/// Todo store holding its data in a caller-owned session.
#[derive(Debug)]
pub struct SessionTodoStore<'a> {
    data: &'a mut SessionTodoLists,
    users: Option<&'a UserDirectory>,
}

impl<'a> SessionTodoStore<'a> {
    /// Creates a store over the session's todo data, seeding it on first use.
    pub fn new(session: &'a mut Session) -> TodoStoreResult<Self> {
        Ok(Self::from_lists(session.todo_lists_mut()?))
    }

    /// Creates a store over an existing dataset.
    pub fn from_lists(data: &'a mut SessionTodoLists) -> Self {
        Self { data, users: None }
    }

    /// Sets the accounts used by [`TodoStore::authenticate`].
    ///
    /// Without a directory every authentication attempt fails.
    pub fn with_users(mut self, users: &'a UserDirectory) -> Self {
        self.users = Some(users);
        self
    }

    fn find_todo_list(&self, todo_list_id: TodoListId) -> Option<&TodoList> {
        self.data.lists.iter().find(|list| list.id == todo_list_id)
    }

    fn find_todo_list_mut(&mut self, todo_list_id: TodoListId) -> Option<&mut TodoList> {
        self.data.lists.iter_mut().find(|list| list.id == todo_list_id)
    }

    fn find_todo(&self, todo_list_id: TodoListId, todo_id: TodoId) -> Option<&Todo> {
        self.find_todo_list(todo_list_id)?.todo(todo_id)
    }

    fn title_taken(&self, title: &str, except: Option<TodoListId>) -> bool {
        self.data
            .lists
            .iter()
            .any(|list| list.title == title && Some(list.id) != except)
    }
}

#[async_trait]
impl<'a> TodoStore for SessionTodoStore<'a> {
    async fn sorted_todo_lists(&self) -> TodoStoreResult<Vec<TodoList>> {
        let lists = self.data.lists.clone();
        let (undone, done) = ordering::partition(lists);
        Ok(ordering::sort_todo_lists(undone, done))
    }

    async fn sorted_todos(&self, todo_list: &TodoList) -> TodoStoreResult<Vec<Todo>> {
        let todos = self
            .find_todo_list(todo_list.id)
            .map(|list| list.todos.clone())
            .unwrap_or_default();
        let (undone, done) = ordering::partition(todos);
        Ok(ordering::sort_todos(undone, done))
    }

    async fn load_todo_list(&self, todo_list_id: TodoListId) -> TodoStoreResult<Option<TodoList>> {
        Ok(self.find_todo_list(todo_list_id).cloned())
    }

    async fn load_todo(
        &self,
        todo_list_id: TodoListId,
        todo_id: TodoId,
    ) -> TodoStoreResult<Option<Todo>> {
        Ok(self.find_todo(todo_list_id, todo_id).cloned())
    }

    async fn exists_todo_list_title(&self, title: &str) -> TodoStoreResult<bool> {
        Ok(self.title_taken(title, None))
    }

    async fn authenticate(&self, username: &str, password: &str) -> TodoStoreResult<bool> {
        match self.users {
            Some(users) => users.authenticate(username, password).await,
            None => Ok(false),
        }
    }

    async fn toggle_done_todo(
        &mut self,
        todo_list_id: TodoListId,
        todo_id: TodoId,
    ) -> TodoStoreResult<bool> {
        let Some(todo) = self
            .find_todo_list_mut(todo_list_id)
            .and_then(|list| list.todo_mut(todo_id))
        else {
            return Ok(false);
        };
        todo.done = !todo.done;
        Ok(true)
    }

    async fn delete_todo(
        &mut self,
        todo_list_id: TodoListId,
        todo_id: TodoId,
    ) -> TodoStoreResult<bool> {
        let Some(list) = self.find_todo_list_mut(todo_list_id) else {
            return Ok(false);
        };
        let Some(index) = list.todos.iter().position(|todo| todo.id == todo_id) else {
            return Ok(false);
        };
        list.todos.remove(index);
        Ok(true)
    }

    async fn delete_todo_list(&mut self, todo_list_id: TodoListId) -> TodoStoreResult<bool> {
        let Some(index) = self
            .data
            .lists
            .iter()
            .position(|list| list.id == todo_list_id)
        else {
            return Ok(false);
        };
        let removed = self.data.lists.remove(index);
        tracing::debug!(
            todo_list_id,
            todos = removed.todos.len(),
            "Deleted session todo list"
        );
        Ok(true)
    }

    async fn complete_all_todos(&mut self, todo_list_id: TodoListId) -> TodoStoreResult<bool> {
        let Some(list) = self.find_todo_list_mut(todo_list_id) else {
            return Ok(false);
        };
        list.todos
            .iter_mut()
            .filter(|todo| !todo.done)
            .for_each(|todo| todo.done = true);
        Ok(true)
    }

    async fn create_todo(
        &mut self,
        title: &str,
        todo_list_id: TodoListId,
    ) -> TodoStoreResult<bool> {
        if self.find_todo_list(todo_list_id).is_none() {
            return Ok(false);
        }
        let todo = Todo::new(self.data.ids.next_id(), title, todo_list_id);
        if let Some(list) = self.find_todo_list_mut(todo_list_id) {
            list.todos.push(todo);
        }
        Ok(true)
    }

    async fn edit_todo_list(
        &mut self,
        new_title: &str,
        todo_list_id: TodoListId,
    ) -> TodoStoreResult<bool> {
        if self.find_todo_list(todo_list_id).is_none() {
            return Ok(false);
        }
        if self.title_taken(new_title, Some(todo_list_id)) {
            return Err(TodoStoreError::duplicate_title(new_title));
        }
        if let Some(list) = self.find_todo_list_mut(todo_list_id) {
            list.title = new_title.to_string();
        }
        Ok(true)
    }

    async fn create_todo_list(&mut self, title: &str) -> TodoStoreResult<bool> {
        if self.title_taken(title, None) {
            tracing::debug!(title, "Rejected duplicate todo list title");
            return Ok(false);
        }
        let id = self.data.ids.next_id();
        self.data.lists.push(TodoList::new(id, title));
        tracing::debug!(todo_list_id = id, "Created session todo list");
        Ok(true)
    }
}
