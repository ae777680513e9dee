//! Completion-then-title ordering shared by every backend.
//!
//! Entries are split into undone and done partitions. Each partition is
//! sorted by lowercased title, with the identifier breaking ties, and the
//! done partition is appended after the undone one.

use entities::{Todo, TodoList};

/// An entry that can be placed by [`partition_then_sort`].
pub trait Ordered {
    /// Title used for the case-insensitive comparison.
    fn title(&self) -> &str;

    /// Identifier used to break ties between equal titles.
    fn id(&self) -> i32;

    /// Whether the entry belongs to the done partition.
    fn is_done(&self) -> bool;
}

impl Ordered for TodoList {
    fn title(&self) -> &str {
        &self.title
    }

    fn id(&self) -> i32 {
        self.id
    }

    fn is_done(&self) -> bool {
        TodoList::is_done(self)
    }
}

impl Ordered for Todo {
    fn title(&self) -> &str {
        &self.title
    }

    fn id(&self) -> i32 {
        self.id
    }

    fn is_done(&self) -> bool {
        self.done
    }
}

/// Splits entries into `(undone, done)` preserving their relative order.
pub fn partition<T: Ordered>(entries: Vec<T>) -> (Vec<T>, Vec<T>) {
    let (done, undone): (Vec<T>, Vec<T>) = entries.into_iter().partition(|e| e.is_done());
    (undone, done)
}

/// Concatenates the sorted undone partition with the sorted done partition.
pub fn sort_partitions<T: Ordered>(mut undone: Vec<T>, mut done: Vec<T>) -> Vec<T> {
    sort_by_title(&mut undone);
    sort_by_title(&mut done);
    undone.append(&mut done);
    undone
}

/// Partitions and sorts in one step.
pub fn partition_then_sort<T: Ordered>(entries: Vec<T>) -> Vec<T> {
    let (undone, done) = partition(entries);
    sort_partitions(undone, done)
}

/// Sorts todo lists: undone lists first, each group by title.
pub fn sort_todo_lists(undone: Vec<TodoList>, done: Vec<TodoList>) -> Vec<TodoList> {
    sort_partitions(undone, done)
}

/// Sorts todos: undone todos first, each group by title.
pub fn sort_todos(undone: Vec<Todo>, done: Vec<Todo>) -> Vec<Todo> {
    sort_partitions(undone, done)
}

fn sort_by_title<T: Ordered>(entries: &mut [T]) {
    entries.sort_by_cached_key(|e| (e.title().to_lowercase(), e.id()));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles<T: Ordered>(entries: &[T]) -> Vec<&str> {
        entries.iter().map(|e| e.title()).collect()
    }

    #[test]
    fn test_undone_lists_precede_done_lists() {
        let lists = vec![
            TodoList::new(1, "banana").with_todos(vec![Todo::new(10, "peel", 1).with_done(true)]),
            TodoList::new(2, "Apple"),
            TodoList::new(3, "cherry"),
        ];

        let sorted = partition_then_sort(lists);

        assert_eq!(titles(&sorted), vec!["Apple", "cherry", "banana"]);
    }

    #[test]
    fn test_title_comparison_ignores_case() {
        let todos = vec![
            Todo::new(1, "delta", 9),
            Todo::new(2, "Bravo", 9),
            Todo::new(3, "alpha", 9).with_done(true),
            Todo::new(4, "Charlie", 9),
            Todo::new(5, "Able", 9).with_done(true),
        ];

        let (undone, done) = partition(todos);
        let sorted = sort_todos(undone, done);

        assert_eq!(
            titles(&sorted),
            vec!["Bravo", "Charlie", "delta", "Able", "alpha"]
        );
    }

    #[test]
    fn test_equal_titles_order_by_id() {
        let todos = vec![
            Todo::new(8, "Same", 1),
            Todo::new(3, "same", 1),
            Todo::new(5, "SAME", 1),
        ];

        let sorted = partition_then_sort(todos);
        let ids: Vec<i32> = sorted.iter().map(|t| t.id).collect();

        assert_eq!(ids, vec![3, 5, 8]);
    }

    #[test]
    fn test_sorting_is_independent_of_input_order() {
        let a = vec![
            TodoList::new(1, "b"),
            TodoList::new(2, "A"),
            TodoList::new(3, "c").with_todos(vec![Todo::new(4, "x", 3).with_done(true)]),
        ];
        let mut b = a.clone();
        b.reverse();

        assert_eq!(partition_then_sort(a), partition_then_sort(b));
    }
}
