use async_trait::async_trait;
use entities::{Todo, TodoId, TodoList, TodoListId};
use sqlx::{PgPool, Pool, Postgres};

use super::{
    log_statement,
    rows::{assemble_todo_lists, TodoListRow, TodoRow},
    schema::POSTGRES_SCHEMA,
};
use crate::{
    credentials::verify_password, is_unique_violation, ordering, TodoStore, TodoStoreError,
    TodoStoreResult,
};

const ALL_TODOLISTS: &str = "SELECT id, title FROM todolists WHERE username = $1";
const ALL_TODOS: &str =
    "SELECT id, title, done, todolist_id FROM todos WHERE username = $1 ORDER BY id";
const FIND_TODOLIST: &str = "SELECT id, title FROM todolists WHERE id = $1 AND username = $2";
const FIND_TODOS: &str = "SELECT id, title, done, todolist_id FROM todos \
     WHERE todolist_id = $1 AND username = $2 ORDER BY id";
const FIND_TODO: &str = "SELECT id, title, done, todolist_id FROM todos \
     WHERE todolist_id = $1 AND id = $2 AND username = $3";
const FIND_TITLE: &str = "SELECT id FROM todolists WHERE title = $1 AND username = $2";
const FIND_USER: &str = "SELECT password FROM users WHERE username = $1";
const TOGGLE_DONE: &str = "UPDATE todos SET done = NOT done \
     WHERE todolist_id = $1 AND id = $2 AND username = $3";
const DELETE_TODO: &str = "DELETE FROM todos WHERE todolist_id = $1 AND id = $2 AND username = $3";
const DELETE_LIST_TODOS: &str = "DELETE FROM todos WHERE todolist_id = $1 AND username = $2";
const DELETE_TODOLIST: &str = "DELETE FROM todolists WHERE id = $1 AND username = $2";
const COMPLETE_ALL: &str = "UPDATE todos SET done = true \
     WHERE todolist_id = $1 AND NOT done AND username = $2";
const CREATE_TODO: &str = "INSERT INTO todos (title, todolist_id, username) \
     SELECT $1, id, username FROM todolists WHERE id = $2 AND username = $3";
const EDIT_TODOLIST: &str = "UPDATE todolists SET title = $1 WHERE id = $2 AND username = $3";
const CREATE_TODOLIST: &str = "INSERT INTO todolists (title, username) VALUES ($1, $2)";

/// PostgreSQL todo store (for multi-user deployments)
#[derive(Debug, Clone)]
pub struct PgTodoStore {
    pool: Pool<Postgres>,
    username: String,
}

impl PgTodoStore {
    /// Create a store bound to `username`
    pub fn new(pool: PgPool, username: impl Into<String>) -> Self {
        let username: String = username.into();
        tracing::debug!(%username, "Created PostgreSQL todo store");
        Self { pool, username }
    }

    /// Create the tables if they do not exist yet
    pub async fn init_schema(pool: &PgPool) -> TodoStoreResult<()> {
        for statement in POSTGRES_SCHEMA {
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
impl TodoStore for PgTodoStore {
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
