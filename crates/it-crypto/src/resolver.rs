//! Identity resolution.
//!
//! Decryption needs the public keys and the monitor privilege of whoever
//! claims to have signed a log. Where those come from (a directory service,
//! a database, a fixed table) is up to the caller, behind [`UserResolver`].

use std::collections::HashMap;

use thiserror::Error;

use crate::identity::RemoteUser;

/// Why an identity could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// No user is known under this id.
    #[error("user not found: {0}")]
    NotFound(String),

    /// The backing directory could not be reached.
    #[error("user directory unavailable: {0}")]
    Unavailable(String),
}

/// Resolves a user id to the user's public identity.
///
/// Implementations may block. Failures are reported, never panicked.
pub trait UserResolver {
    fn fetch_user(&self, id: &str) -> Result<RemoteUser, LookupError>;
}

impl<F> UserResolver for F
where
    F: Fn(&str) -> Result<RemoteUser, LookupError>,
{
    fn fetch_user(&self, id: &str) -> Result<RemoteUser, LookupError> {
        self(id)
    }
}

/// An in-memory directory of known users.
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    users: HashMap<String, RemoteUser>,
}

impl UserDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a user, keyed by its id.
    pub fn insert(&mut self, user: RemoteUser) {
        self.users.insert(user.id().to_string(), user);
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_user(mut self, user: RemoteUser) -> Self {
        self.insert(user);
        self
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl UserResolver for UserDirectory {
    fn fetch_user(&self, id: &str) -> Result<RemoteUser, LookupError> {
        self.users
            .get(id)
            .cloned()
            .ok_or_else(|| LookupError::NotFound(id.to_string()))
    }
}

impl FromIterator<RemoteUser> for UserDirectory {
    fn from_iter<I: IntoIterator<Item = RemoteUser>>(iter: I) -> Self {
        let mut directory = Self::new();
        for user in iter {
            directory.insert(user);
        }
        directory
    }
}
