//! Identifier generation for the session backend.

use entities::TodoList;
use serde::{Deserialize, Serialize};

/// Monotonic counter handing out list and todo IDs within one session.
///
/// Lists and todos draw from the same sequence, so an ID is never handed out
/// twice in a session. Freed IDs are not reused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdGenerator {
    next: i32,
}

impl IdGenerator {
    /// Creates a generator whose first ID is `first`.
    pub fn starting_at(first: i32) -> Self {
        Self { next: first }
    }

    /// Creates a generator that starts after every ID already used by `lists`.
    pub fn after(lists: &[TodoList]) -> Self {
        let highest = lists
            .iter()
            .flat_map(|list| std::iter::once(list.id).chain(list.todos.iter().map(|t| t.id)))
            .max()
            .unwrap_or(0);
        Self::starting_at(highest + 1)
    }

    /// Returns the next unused ID.
    pub fn next_id(&mut self) -> i32 {
        let id = self.next;
        self.next += 1;
        id
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

#[cfg(test)]
mod tests {
    use entities::Todo;

    use super::*;

    #[test]
    fn test_ids_are_monotonic() {
        let mut ids = IdGenerator::default();

        assert_eq!(ids.next_id(), 1);
        assert_eq!(ids.next_id(), 2);
        assert_eq!(ids.next_id(), 3);
    }

    #[test]
    fn test_starts_after_existing_ids() {
        let lists = vec![
            TodoList::new(2, "Home").with_todos(vec![Todo::new(9, "Sweep", 2)]),
            TodoList::new(4, "Work"),
        ];

        let mut ids = IdGenerator::after(&lists);

        assert_eq!(ids.next_id(), 10);
    }

    #[test]
    fn test_empty_dataset_starts_at_one() {
        assert_eq!(IdGenerator::after(&[]).next_id(), 1);
    }
}
