//! User accounts and the user directory
//!
//! The directory is loaded once at startup and read concurrently by every
//! session during `connect`.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::error::AuthError;

/// Accounts available when no other source is configured.
pub const DEFAULT_USERS: &[(&str, &str)] = &[
    ("user1", "password1"),
    ("user2", "password2"),
    ("user3", "password3"),
];

/// A registered account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    name: String,
    password: String,
}

impl User {
    pub fn new(name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            password: password.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check a plaintext credential against this account
    pub fn password_matches(&self, password: &str) -> bool {
        self.password == password
    }
}

/// Concurrent name → user map
///
/// One lock covers the whole map; lookups and updates serialize against each other.
#[derive(Debug, Default)]
pub struct UserDirectory {
    users: Mutex<HashMap<String, Arc<User>>>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a directory preloaded with `DEFAULT_USERS`
    pub fn with_default_users() -> Self {
        let directory = Self::new();
        for (name, password) in DEFAULT_USERS {
            directory.add(User::new(*name, *password));
        }
        directory
    }

    /// Insert a user, replacing any existing account of the same name
    pub fn add(&self, user: User) {
        self.users.lock().insert(user.name.clone(), Arc::new(user));
    }

    /// Remove the account with this name, if any
    pub fn remove(&self, name: &str) -> Option<Arc<User>> {
        self.users.lock().remove(name)
    }

    pub fn get_by_name(&self, name: &str) -> Option<Arc<User>> {
        self.users.lock().get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.users.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.lock().is_empty()
    }

    /// Look up `name` and verify `password`
    pub fn authenticate(&self, name: &str, password: &str) -> Result<Arc<User>, AuthError> {
        let Some(user) = self.get_by_name(name) else {
            debug!("Authentication failed for '{}': no such user", name);
            return Err(AuthError::UserNotFound);
        };

        if !user.password_matches(password) {
            debug!("Authentication failed for '{}': wrong password", name);
            return Err(AuthError::InvalidCredentials);
        }

        Ok(user)
    }
}
