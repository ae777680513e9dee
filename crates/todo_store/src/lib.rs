//! Per-user todo list persistence.
//!
//! This crate stores todo lists and their todos for one signed-in user at a
//! time. Every backend implements [`TodoStore`]:
//!
//! - [`PgTodoStore`] and [`SqliteTodoStore`] issue parameterized statements
//!   against a relational database.
//! - [`SessionTodoStore`] keeps the data in a caller-owned [`Session`].
//!
//! All backends share the ordering in [`ordering`] and report missing or
//! foreign entities as `false` / `None` rather than as errors.

mod config;
mod credentials;
mod error;
mod id;
mod memory;
pub mod ordering;
mod relational;
mod session;
mod traits;


pub use config::*;
pub use credentials::*;
pub use error::*;
pub use id::*;
pub use memory::*;
pub use relational::*;
pub use session::*;
pub use traits::*;
