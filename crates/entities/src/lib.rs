//! Core entity definitions for the todo store.
//!
//! This crate defines the plain data types shared by every persistence
//! backend: users, todo lists and their todos.

mod todo;
mod user;

pub use todo::*;
pub use user::*;
