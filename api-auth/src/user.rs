//! A ready-made user with an argon2 password hash.

use password_auth::{generate_hash, verify_password};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AuthUser;

/// A user identified by a UUID string and searchable by `"id"` and
/// `"email"`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordUser {
    id: String,

    /// The user's email address.
    pub email: String,

    password_hash: String,
}

impl PasswordUser {
    /// Creates a user with a fresh ID, hashing the plaintext `password`.
    pub fn new(email: impl Into<String>, password: &str) -> Self {
        Self::from_hash(Uuid::new_v4().to_string(), email, generate_hash(password))
    }

    /// Creates a user from an already stored password hash.
    pub fn from_hash(
        id: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            password_hash: password_hash.into(),
        }
    }

    /// The stored password hash, in PHC string format.
    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }
}

// Here we've implemented `Debug` manually to avoid accidentally logging the
// password hash.
impl std::fmt::Debug for PasswordUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordUser")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"[redacted]")
            .finish()
    }
}

impl AuthUser for PasswordUser {
    type Id = String;

    fn id(&self) -> Self::Id {
        self.id.clone()
    }

    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "id" => Some(&self.id),
            "email" => Some(&self.email),
            _ => None,
        }
    }

    fn verify_secret(&self, secret: &str) -> bool {
        verify_password(secret, &self.password_hash).is_ok()
    }
}
