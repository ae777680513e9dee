//! Command parsing and execution.

use anyhow::{Context, bail};
use entities::{TodoId, TodoList, TodoListId};
use todo_store::TodoStore;

/// A single store operation requested on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Lists,
    Show(TodoListId),
    CreateList(String),
    RenameList(TodoListId, String),
    DeleteList(TodoListId),
    Add(TodoListId, String),
    Toggle(TodoListId, TodoId),
    Delete(TodoListId, TodoId),
    Complete(TodoListId),
    Login(String, String),
}

pub const USAGE: &str = "usage: todo-cli <command>

commands:
  lists                      show every list
  show <list>                show one list with sorted todos
  create-list <title>        create a list
  rename-list <list> <title> rename a list
  delete-list <list>         delete a list and its todos
  add <list> <title>         add a todo
  toggle <list> <todo>       flip a todo's done flag
  delete <list> <todo>       delete a todo
  complete <list>            mark every todo in a list done
  login <user> <password>    check credentials";

fn id(arg: Option<&String>, name: &str) -> anyhow::Result<i32> {
    let arg = arg.with_context(|| format!("missing {name}"))?;
    arg.parse()
        .with_context(|| format!("{name} must be numeric, got {arg:?}"))
}

fn text(args: &[String], name: &str) -> anyhow::Result<String> {
    let text = args.join(" ");
    if text.trim().is_empty() {
        bail!("{name} must not be empty");
    }
    Ok(text.trim().to_string())
}

impl Command {
    /// Parses the arguments following the program name.
    pub fn parse(args: &[String]) -> anyhow::Result<Self> {
        let Some((name, rest)) = args.split_first() else {
            bail!("no command given");
        };

        let command = match name.as_str() {
            "lists" => Self::Lists,
            "show" => Self::Show(id(rest.first(), "list id")?),
            "create-list" => Self::CreateList(text(rest, "title")?),
            "rename-list" => Self::RenameList(
                id(rest.first(), "list id")?,
                text(rest.get(1..).unwrap_or_default(), "title")?,
            ),
            "delete-list" => Self::DeleteList(id(rest.first(), "list id")?),
            "add" => Self::Add(
                id(rest.first(), "list id")?,
                text(rest.get(1..).unwrap_or_default(), "title")?,
            ),
            "toggle" => Self::Toggle(id(rest.first(), "list id")?, id(rest.get(1), "todo id")?),
            "delete" => Self::Delete(id(rest.first(), "list id")?, id(rest.get(1), "todo id")?),
            "complete" => Self::Complete(id(rest.first(), "list id")?),
            "login" => Self::Login(
                rest.first().context("missing username")?.clone(),
                rest.get(1).context("missing password")?.clone(),
            ),
            other => bail!("unknown command: {other}"),
        };
        Ok(command)
    }
}

fn print_list(store: &dyn TodoStore, list: &TodoList) {
    let status = if store.is_done_todo_list(list) {
        "done"
    } else {
        "open"
    };
    let remaining = list.todos.iter().filter(|t| !t.done).count();
    println!(
        "{:>4}  [{status}] {} ({remaining}/{} remaining)",
        list.id,
        list.title,
        list.todos.len()
    );
}

fn report(ok: bool, success: &str, not_found: &str) {
    if ok {
        println!("{success}");
    } else {
        println!("{not_found}");
    }
}

/// Runs one command against the store and prints its result.
pub async fn run(store: &mut dyn TodoStore, command: Command) -> anyhow::Result<()> {
    tracing::debug!(?command, "Running command");

    match command {
        Command::Lists => {
            for list in store.sorted_todo_lists().await? {
                print_list(store, &list);
            }
        }
        Command::Show(list_id) => match store.load_todo_list(list_id).await? {
            Some(list) => {
                print_list(store, &list);
                for todo in store.sorted_todos(&list).await? {
                    let mark = if todo.done { "x" } else { " " };
                    println!("      {:>4}  [{mark}] {}", todo.id, todo.title);
                }
            }
            None => println!("The specified todo list was not found."),
        },
        Command::CreateList(title) => report(
            store.create_todo_list(&title).await?,
            "The todo list has been created.",
            "The list title must be unique.",
        ),
        Command::RenameList(list_id, title) => report(
            store.edit_todo_list(&title, list_id).await?,
            "Todo list updated.",
            "The specified todo list was not found.",
        ),
        Command::DeleteList(list_id) => report(
            store.delete_todo_list(list_id).await?,
            "Todo list deleted.",
            "The specified todo list was not found.",
        ),
        Command::Add(list_id, title) => report(
            store.create_todo(&title, list_id).await?,
            "The todo was added.",
            "The specified todo list was not found.",
        ),
        Command::Toggle(list_id, todo_id) => report(
            store.toggle_done_todo(list_id, todo_id).await?,
            "Todo updated.",
            "The specified todo was not found.",
        ),
        Command::Delete(list_id, todo_id) => report(
            store.delete_todo(list_id, todo_id).await?,
            "The todo has been deleted.",
            "The specified todo was not found.",
        ),
        Command::Complete(list_id) => report(
            store.complete_all_todos(list_id).await?,
            "All todos have been marked as done.",
            "The specified todo list was not found.",
        ),
        Command::Login(username, password) => report(
            store.authenticate(&username, &password).await?,
            "Welcome!",
            "Invalid credentials.",
        ),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse(&args("lists")).unwrap(), Command::Lists);
        assert_eq!(
            Command::parse(&args("add 3 buy more milk")).unwrap(),
            Command::Add(3, "buy more milk".to_string())
        );
        assert_eq!(
            Command::parse(&args("toggle 3 7")).unwrap(),
            Command::Toggle(3, 7)
        );
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(Command::parse(&[]).is_err());
        assert!(Command::parse(&args("show abc")).is_err());
        assert!(Command::parse(&args("create-list")).is_err());
        assert!(Command::parse(&args("frobnicate")).is_err());
    }
}
