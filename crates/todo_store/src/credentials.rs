//! Password credential checks.

use std::collections::HashMap;

use entities::User;

use crate::TodoStoreResult;

/// Compares a plaintext password against a stored bcrypt hash.
///
/// Bcrypt is deliberately slow, so the comparison runs on the blocking pool.
pub async fn verify_password(password: &str, password_hash: &str) -> TodoStoreResult<bool> {
    let password = password.to_string();
    let password_hash = password_hash.to_string();
    let matches =
        tokio::task::spawn_blocking(move || bcrypt::verify(password, &password_hash)).await??;
    Ok(matches)
}

/// Hashes a plaintext password with the given bcrypt cost.
pub fn hash_password(password: &str, cost: u32) -> TodoStoreResult<String> {
    Ok(bcrypt::hash(password, cost)?)
}

/// In-process user accounts for the session backend.
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    users: HashMap<String, User>,
}

impl UserDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a user.
    pub fn insert(&mut self, user: User) {
        self.users.insert(user.username.clone(), user);
    }

    /// Adds a user with the given plaintext password, hashing it at `cost`.
    pub fn with_password(
        mut self,
        username: impl Into<String>,
        password: &str,
        cost: u32,
    ) -> TodoStoreResult<Self> {
        let hash = hash_password(password, cost)?;
        self.insert(User::new(username, hash));
        Ok(self)
    }

    /// Looks up a user by username.
    pub fn get(&self, username: &str) -> Option<&User> {
        self.users.get(username)
    }

    /// Returns true if `username` exists and `password` matches its hash.
    pub async fn authenticate(&self, username: &str, password: &str) -> TodoStoreResult<bool> {
        match self.get(username) {
            Some(user) => verify_password(password, &user.password_hash).await,
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_COST: u32 = 4;

    #[tokio::test]
    async fn test_verify_password() {
        let hash = hash_password("secret", TEST_COST).unwrap();

        assert!(verify_password("secret", &hash).await.unwrap());
        assert!(!verify_password("wrong", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_malformed_hash_is_an_error() {
        assert!(verify_password("secret", "not-a-hash").await.is_err());
    }

    #[tokio::test]
    async fn test_directory_authenticate() {
        let users = UserDirectory::new()
            .with_password("admin", "secret", TEST_COST)
            .unwrap();

        assert!(users.authenticate("admin", "secret").await.unwrap());
        assert!(!users.authenticate("admin", "nope").await.unwrap());
        assert!(!users.authenticate("ghost", "secret").await.unwrap());
    }
}
