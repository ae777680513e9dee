use entities::{Todo, TodoList};
use sqlx::FromRow;

/// Database row for TodoList
#[derive(Debug, FromRow)]
pub(crate) struct TodoListRow {
    pub id: i32,
    pub title: String,
}

impl TodoListRow {
    pub fn into_todo_list(self, todos: Vec<Todo>) -> TodoList {
        TodoList::new(self.id, self.title).with_todos(todos)
    }
}

/// Database row for Todo
#[derive(Debug, FromRow)]
pub(crate) struct TodoRow {
    pub id: i32,
    pub title: String,
    pub done: bool,
    pub todolist_id: i32,
}

impl From<TodoRow> for Todo {
    fn from(row: TodoRow) -> Self {
        Todo::new(row.id, row.title, row.todolist_id).with_done(row.done)
    }
}

/// Attaches each todo row to its list row.
pub(crate) fn assemble_todo_lists(lists: Vec<TodoListRow>, todos: Vec<TodoRow>) -> Vec<TodoList> {
    let todos: Vec<Todo> = todos.into_iter().map(Todo::from).collect();
    lists
        .into_iter()
        .map(|row| {
            let own = todos
                .iter()
                .filter(|todo| todo.todo_list_id == row.id)
                .cloned()
                .collect();
            row.into_todo_list(own)
        })
        .collect()
}
