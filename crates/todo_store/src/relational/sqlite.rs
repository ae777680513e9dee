use async_trait::async_trait;
use entities::{Todo, TodoId, TodoList, TodoListId};
use sqlx::{Pool, Sqlite, SqlitePool};

use super::{
    log_statement,
    rows::{assemble_todo_lists, TodoListRow, TodoRow},
    schema::SQLITE_SCHEMA,
};
use crate::{
    credentials::verify_password, is_unique_violation, ordering, TodoStore, TodoStoreError,
    TodoStoreResult,
};

const ALL_TODOLISTS: &str = "SELECT id, title FROM todolists WHERE username = ?";
const ALL_TODOS: &str =
    "SELECT id, title, done, todolist_id FROM todos WHERE username = ? ORDER BY id";
const FIND_TODOLIST: &str = "SELECT id, title FROM todolists WHERE id = ? AND username = ?";
const FIND_TODOS: &str = "SELECT id, title, done, todolist_id FROM todos \
     WHERE todolist_id = ? AND username = ? ORDER BY id";
const FIND_TODO: &str = "SELECT id, title, done, todolist_id FROM todos \
     WHERE todolist_id = ? AND id = ? AND username = ?";
const FIND_TITLE: &str = "SELECT id FROM todolists WHERE title = ? AND username = ?";
const FIND_USER: &str = "SELECT password FROM users WHERE username = ?";
const TOGGLE_DONE: &str = "UPDATE todos SET done = NOT done \
     WHERE todolist_id = ? AND id = ? AND username = ?";
const DELETE_TODO: &str = "DELETE FROM todos WHERE todolist_id = ? AND id = ? AND username = ?";
const DELETE_LIST_TODOS: &str = "DELETE FROM todos WHERE todolist_id = ? AND username = ?";
const DELETE_TODOLIST: &str = "DELETE FROM todolists WHERE id = ? AND username = ?";
const COMPLETE_ALL: &str = "UPDATE todos SET done = 1 \
     WHERE todolist_id = ? AND NOT done AND username = ?";
const CREATE_TODO: &str = "INSERT INTO todos (title, todolist_id, username) \
     SELECT ?, id, username FROM todolists WHERE id = ? AND username = ?";
const EDIT_TODOLIST: &str = "UPDATE todolists SET title = ? WHERE id = ? AND username = ?";
const CREATE_TODOLIST: &str = "INSERT INTO todolists (title, username) VALUES (?, ?)";

/// SQLite todo store (for single-user mode)
#[derive(Debug, Clone)]
pub struct SqliteTodoStore {
    pool: Pool<Sqlite>,
    username: String,
}

impl SqliteTodoStore {
    /// Create a store bound to `username`
    pub fn new(pool: SqlitePool, username: impl Into<String>) -> Self {
        let username: String = username.into();
        tracing::debug!(%username, "Created SQLite todo store");
        Self { pool, username }
    }

    /// Create the tables if they do not exist yet
    pub async fn init_schema(pool: &SqlitePool) -> TodoStoreResult<()> {
        for statement in SQLITE_SCHEMA {
            sqlx::query(statement).execute(pool).await?;
        }
        Ok(())
    }

    /// Username every statement is scoped to
    pub fn username(&self) -> &str {
        &self.username
    }

    async fn fetch_todo_list(
        &self,
        todo_list_id: TodoListId,
    ) -> TodoStoreResult<Option<TodoListRow>> {
        log_statement(FIND_TODOLIST, &[&todo_list_id, &self.username]);
        let row = sqlx::query_as(FIND_TODOLIST)
            .bind(todo_list_id)
            .bind(&self.username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn fetch_todos(&self, todo_list_id: TodoListId) -> TodoStoreResult<Vec<Todo>> {
        log_statement(FIND_TODOS, &[&todo_list_id, &self.username]);
        let rows: Vec<TodoRow> = sqlx::query_as(FIND_TODOS)
            .bind(todo_list_id)
            .bind(&self.username)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Todo::from).collect())
    }
}

#[async_trait]
impl TodoStore for SqliteTodoStore {
    async fn sorted_todo_lists(&self) -> TodoStoreResult<Vec<TodoList>> {
        log_statement(ALL_TODOLISTS, &[&self.username]);
        log_statement(ALL_TODOS, &[&self.username]);
        let (lists, todos) = tokio::try_join!(
            sqlx::query_as::<_, TodoListRow>(ALL_TODOLISTS)
                .bind(&self.username)
                .fetch_all(&self.pool),
            sqlx::query_as::<_, TodoRow>(ALL_TODOS)
                .bind(&self.username)
                .fetch_all(&self.pool),
        )?;

        Ok(ordering::partition_then_sort(assemble_todo_lists(lists, todos)))
    }

    async fn sorted_todos(&self, todo_list: &TodoList) -> TodoStoreResult<Vec<Todo>> {
        let todos = self.fetch_todos(todo_list.id).await?;
        let (undone, done) = ordering::partition(todos);
        Ok(ordering::sort_todos(undone, done))
    }

    async fn load_todo_list(&self, todo_list_id: TodoListId) -> TodoStoreResult<Option<TodoList>> {
        let (list, todos) = tokio::try_join!(
            self.fetch_todo_list(todo_list_id),
            self.fetch_todos(todo_list_id),
        )?;

        Ok(list.map(|row| row.into_todo_list(todos)))
    }

    async fn load_todo(
        &self,
        todo_list_id: TodoListId,
        todo_id: TodoId,
    ) -> TodoStoreResult<Option<Todo>> {
        log_statement(FIND_TODO, &[&todo_list_id, &todo_id, &self.username]);
        let row: Option<TodoRow> = sqlx::query_as(FIND_TODO)
            .bind(todo_list_id)
            .bind(todo_id)
            .bind(&self.username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Todo::from))
    }

    async fn exists_todo_list_title(&self, title: &str) -> TodoStoreResult<bool> {
        log_statement(FIND_TITLE, &[&title, &self.username]);
        let row: Option<(i32,)> = sqlx::query_as(FIND_TITLE)
            .bind(title)
            .bind(&self.username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.is_some())
    }

    async fn authenticate(&self, username: &str, password: &str) -> TodoStoreResult<bool> {
        log_statement(FIND_USER, &[&username]);
        let row: Option<(String,)> = sqlx::query_as(FIND_USER)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some((password_hash,)) => verify_password(password, &password_hash).await,
            None => Ok(false),
        }
    }

    async fn toggle_done_todo(
        &mut self,
        todo_list_id: TodoListId,
        todo_id: TodoId,
    ) -> TodoStoreResult<bool> {
        log_statement(TOGGLE_DONE, &[&todo_list_id, &todo_id, &self.username]);
        let result = sqlx::query(TOGGLE_DONE)
            .bind(todo_list_id)
            .bind(todo_id)
            .bind(&self.username)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_todo(
        &mut self,
        todo_list_id: TodoListId,
        todo_id: TodoId,
    ) -> TodoStoreResult<bool> {
        log_statement(DELETE_TODO, &[&todo_list_id, &todo_id, &self.username]);
        let result = sqlx::query(DELETE_TODO)
            .bind(todo_list_id)
            .bind(todo_id)
            .bind(&self.username)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_todo_list(&mut self, todo_list_id: TodoListId) -> TodoStoreResult<bool> {
        let mut tx = self.pool.begin().await?;

        log_statement(DELETE_LIST_TODOS, &[&todo_list_id, &self.username]);
        sqlx::query(DELETE_LIST_TODOS)
            .bind(todo_list_id)
            .bind(&self.username)
            .execute(&mut *tx)
            .await?;

        log_statement(DELETE_TODOLIST, &[&todo_list_id, &self.username]);
        let result = sqlx::query(DELETE_TODOLIST)
            .bind(todo_list_id)
            .bind(&self.username)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn complete_all_todos(&mut self, todo_list_id: TodoListId) -> TodoStoreResult<bool> {
        let mut tx = self.pool.begin().await?;

        log_statement(FIND_TODOLIST, &[&todo_list_id, &self.username]);
        let list: Option<TodoListRow> = sqlx::query_as(FIND_TODOLIST)
            .bind(todo_list_id)
            .bind(&self.username)
            .fetch_optional(&mut *tx)
            .await?;
        if list.is_none() {
            return Ok(false);
        }

        log_statement(COMPLETE_ALL, &[&todo_list_id, &self.username]);
        let result = sqlx::query(COMPLETE_ALL)
            .bind(todo_list_id)
            .bind(&self.username)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::debug!(todo_list_id, completed = result.rows_affected(), "Completed todos");
        Ok(true)
    }

    async fn create_todo(
        &mut self,
        title: &str,
        todo_list_id: TodoListId,
    ) -> TodoStoreResult<bool> {
        log_statement(CREATE_TODO, &[&title, &todo_list_id, &self.username]);
        let result = sqlx::query(CREATE_TODO)
            .bind(title)
            .bind(todo_list_id)
            .bind(&self.username)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn edit_todo_list(
        &mut self,
        new_title: &str,
        todo_list_id: TodoListId,
    ) -> TodoStoreResult<bool> {
        log_statement(EDIT_TODOLIST, &[&new_title, &todo_list_id, &self.username]);
        let result = sqlx::query(EDIT_TODOLIST)
            .bind(new_title)
            .bind(todo_list_id)
            .bind(&self.username)
            .execute(&self.pool)
            .await;

        match result {
            Ok(result) => Ok(result.rows_affected() > 0),
            Err(e) if is_unique_violation(&e) => Err(TodoStoreError::duplicate_title(new_title)),
            Err(e) => Err(e.into()),
        }
    }

    async fn create_todo_list(&mut self, title: &str) -> TodoStoreResult<bool> {
        log_statement(CREATE_TODOLIST, &[&title, &self.username]);
        let result = sqlx::query(CREATE_TODOLIST)
            .bind(title)
            .bind(&self.username)
            .execute(&self.pool)
            .await;

        match result {
            Ok(result) => Ok(result.rows_affected() > 0),
            Err(e) if is_unique_violation(&e) => {
                tracing::info!(title, username = %self.username, "Todo list title already exists");
                Ok(false)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to create todo list");
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use sqlx::sqlite::SqlitePoolOptions;

    use super::*;
    use crate::credentials::hash_password;

    async fn test_pool() -> SqlitePool {
        // An in-memory database lives only as long as its connection.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        SqliteTodoStore::init_schema(&pool).await.unwrap();

        for (username, password) in [("alice", "alice-pw"), ("bob", "bob-pw")] {
            sqlx::query("INSERT INTO users (username, password) VALUES (?, ?)")
                .bind(username)
                .bind(hash_password(password, 4).unwrap())
                .execute(&pool)
                .await
                .unwrap();
        }
        pool
    }

    async fn list_id(store: &SqliteTodoStore, title: &str) -> TodoListId {
        store
            .sorted_todo_lists()
            .await
            .unwrap()
            .into_iter()
            .find(|list| list.title == title)
            .map(|list| list.id)
            .unwrap()
    }

    #[tokio::test]
    async fn test_sorted_todo_lists() {
        let pool = test_pool().await;
        let mut store = SqliteTodoStore::new(pool, "alice");

        for title in ["banana", "Apple", "cherry"] {
            assert!(store.create_todo_list(title).await.unwrap());
        }
        let banana = list_id(&store, "banana").await;
        assert!(store.create_todo("peel", banana).await.unwrap());
        assert!(store.complete_all_todos(banana).await.unwrap());

        let lists = store.sorted_todo_lists().await.unwrap();
        let titles: Vec<&str> = lists.iter().map(|l| l.title.as_str()).collect();

        assert_eq!(titles, vec!["Apple", "cherry", "banana"]);
        assert_eq!(lists[2].todos.len(), 1);
        assert!(store.is_done_todo_list(&lists[2]));
        assert!(!store.is_done_todo_list(&lists[0]));
    }

    #[tokio::test]
    async fn test_sorted_todos() {
        let pool = test_pool().await;
        let mut store = SqliteTodoStore::new(pool, "alice");

        store.create_todo_list("Chores").await.unwrap();
        let chores = list_id(&store, "Chores").await;
        for title in ["wash", "Core", "bite"] {
            store.create_todo(title, chores).await.unwrap();
        }
        let list = store.load_todo_list(chores).await.unwrap().unwrap();
        let core = list.todos.iter().find(|t| t.title == "Core").unwrap().id;
        assert!(store.toggle_done_todo(chores, core).await.unwrap());

        let todos = store.sorted_todos(&list).await.unwrap();
        let titles: Vec<&str> = todos.iter().map(|t| t.title.as_str()).collect();

        assert_eq!(titles, vec!["bite", "wash", "Core"]);
    }

    #[tokio::test]
    async fn test_create_todo_list_duplicate_title() {
        let pool = test_pool().await;
        let mut store = SqliteTodoStore::new(pool, "alice");

        assert!(store.create_todo_list("X").await.unwrap());
        assert!(!store.create_todo_list("X").await.unwrap());
        assert!(store.exists_todo_list_title("X").await.unwrap());
        assert!(!store.exists_todo_list_title("x").await.unwrap());

        let lists = store.sorted_todo_lists().await.unwrap();
        assert_eq!(lists.iter().filter(|l| l.title == "X").count(), 1);
    }

    #[tokio::test]
    async fn test_other_constraint_violations_propagate() {
        let pool = test_pool().await;
        let mut store = SqliteTodoStore::new(pool, "nobody");

        let err = store.create_todo_list("Orphan").await.unwrap_err();

        assert!(matches!(err, TodoStoreError::Database(_)));
    }

    #[tokio::test]
    async fn test_toggle_missing_todo_changes_nothing() {
        let pool = test_pool().await;
        let mut store = SqliteTodoStore::new(pool, "alice");

        store.create_todo_list("Home").await.unwrap();
        let home = list_id(&store, "Home").await;
        store.create_todo("Sweep", home).await.unwrap();
        let before = store.sorted_todo_lists().await.unwrap();

        assert!(!store.toggle_done_todo(home, 9999).await.unwrap());
        assert!(!store.toggle_done_todo(9999, 1).await.unwrap());

        assert_eq!(store.sorted_todo_lists().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_delete_todo() {
        let pool = test_pool().await;
        let mut store = SqliteTodoStore::new(pool, "alice");

        store.create_todo_list("Home").await.unwrap();
        let home = list_id(&store, "Home").await;
        store.create_todo("Sweep", home).await.unwrap();
        let sweep = store.load_todo_list(home).await.unwrap().unwrap().todos[0].id;

        assert!(store.delete_todo(home, sweep).await.unwrap());
        assert!(store.load_todo(home, sweep).await.unwrap().is_none());
        assert!(!store.delete_todo(home, sweep).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_todo_list_removes_todos() {
        let pool = test_pool().await;
        let mut store = SqliteTodoStore::new(pool.clone(), "alice");

        store.create_todo_list("Home").await.unwrap();
        let home = list_id(&store, "Home").await;
        store.create_todo("Sweep", home).await.unwrap();
        store.create_todo("Cook", home).await.unwrap();
        let todo_ids: Vec<TodoId> = store
            .load_todo_list(home)
            .await
            .unwrap()
            .unwrap()
            .todos
            .iter()
            .map(|t| t.id)
            .collect();

        assert!(store.delete_todo_list(home).await.unwrap());
        assert!(store.load_todo_list(home).await.unwrap().is_none());
        for todo_id in todo_ids {
            assert!(store.load_todo(home, todo_id).await.unwrap().is_none());
        }
        let (remaining,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM todos WHERE todolist_id = ?")
                .bind(home)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(remaining, 0);
        assert!(!store.delete_todo_list(home).await.unwrap());
    }

    #[tokio::test]
    async fn test_complete_all_todos() {
        let pool = test_pool().await;
        let mut store = SqliteTodoStore::new(pool, "alice");

        store.create_todo_list("Work").await.unwrap();
        let work = list_id(&store, "Work").await;
        store.create_todo("Email", work).await.unwrap();
        store.create_todo("Call", work).await.unwrap();
        let email = store.load_todo_list(work).await.unwrap().unwrap().todos[0].id;
        store.toggle_done_todo(work, email).await.unwrap();

        assert!(store.complete_all_todos(work).await.unwrap());
        let list = store.load_todo_list(work).await.unwrap().unwrap();
        assert!(list.todos.iter().all(|t| t.done));

        // Nothing left to complete, the list still exists.
        assert!(store.complete_all_todos(work).await.unwrap());
        assert!(!store.complete_all_todos(9999).await.unwrap());
    }

    #[tokio::test]
    async fn test_edit_todo_list() {
        let pool = test_pool().await;
        let mut store = SqliteTodoStore::new(pool, "alice");

        store.create_todo_list("Work").await.unwrap();
        store.create_todo_list("Home").await.unwrap();
        let work = list_id(&store, "Work").await;

        assert!(store.edit_todo_list("Office", work).await.unwrap());
        assert_eq!(
            store.load_todo_list(work).await.unwrap().unwrap().title,
            "Office"
        );
        assert!(!store.edit_todo_list("Nowhere", 9999).await.unwrap());

        let err = store.edit_todo_list("Home", work).await.unwrap_err();
        assert!(matches!(err, TodoStoreError::DuplicateTitle { .. }));
    }

    #[tokio::test]
    async fn test_create_todo_in_missing_list() {
        let pool = test_pool().await;
        let mut store = SqliteTodoStore::new(pool, "alice");

        assert!(!store.create_todo("Lost", 9999).await.unwrap());
    }

    #[tokio::test]
    async fn test_other_users_data_is_not_found() {
        let pool = test_pool().await;
        let mut alice = SqliteTodoStore::new(pool.clone(), "alice");
        let mut bob = SqliteTodoStore::new(pool, "bob");

        alice.create_todo_list("Groceries").await.unwrap();
        let groceries = list_id(&alice, "Groceries").await;
        alice.create_todo("Milk", groceries).await.unwrap();
        let milk = alice.load_todo_list(groceries).await.unwrap().unwrap().todos[0].id;

        assert!(bob.sorted_todo_lists().await.unwrap().is_empty());
        assert!(bob.load_todo_list(groceries).await.unwrap().is_none());
        assert!(bob.load_todo(groceries, milk).await.unwrap().is_none());
        assert!(!bob.exists_todo_list_title("Groceries").await.unwrap());
        assert!(!bob.toggle_done_todo(groceries, milk).await.unwrap());
        assert!(!bob.delete_todo(groceries, milk).await.unwrap());
        assert!(!bob.complete_all_todos(groceries).await.unwrap());
        assert!(!bob.create_todo("Eggs", groceries).await.unwrap());
        assert!(!bob.edit_todo_list("Mine now", groceries).await.unwrap());
        assert!(!bob.delete_todo_list(groceries).await.unwrap());

        // Titles are unique per user, not globally.
        assert!(bob.create_todo_list("Groceries").await.unwrap());

        let list = alice.load_todo_list(groceries).await.unwrap().unwrap();
        assert_eq!(list.title, "Groceries");
        assert_eq!(list.todos.len(), 1);
        assert!(!list.todos[0].done);
    }

    #[tokio::test]
    async fn test_authenticate() {
        let pool = test_pool().await;
        let store = SqliteTodoStore::new(pool, "alice");

        assert!(store.authenticate("alice", "alice-pw").await.unwrap());
        assert!(!store.authenticate("alice", "bob-pw").await.unwrap());
        assert!(!store.authenticate("carol", "alice-pw").await.unwrap());
    }
}
