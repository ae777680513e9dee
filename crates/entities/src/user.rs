//! User entity definitions.

use serde::{Deserialize, Serialize};

/// A user account with its stored credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique username.
    pub username: String,
    /// Bcrypt hash of the user's password.
    pub password_hash: String,
}

impl User {
    /// Creates a user from a username and an already hashed password.
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
        }
    }
}
