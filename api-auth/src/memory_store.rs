//! An in-memory implementation of `UserDirectory`.

use std::{collections::HashMap, convert::Infallible, sync::Arc};

use async_trait::async_trait;
use tokio::{sync::RwLock, task};

use crate::{backend::UserId, AuthUser, PasswordUser, UserDirectory};

/// An error returned when registering a user.
#[derive(Debug, thiserror::Error)]
pub enum RegisterError {
    /// A user with this email already exists.
    #[error("user {0} already exists")]
    AlreadyExists(String),

    /// Hashing the password failed to complete.
    #[error(transparent)]
    TaskJoin(#[from] task::JoinError),
}

/// An ephemeral directory, useful for testing and demonstration purposes.
#[derive(Debug)]
pub struct MemoryDirectory<User: AuthUser> {
    inner: Arc<RwLock<HashMap<User::Id, User>>>,
}

impl<User: AuthUser> Clone for MemoryDirectory<User> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<User: AuthUser> Default for MemoryDirectory<User> {
    fn default() -> Self {
        Self {
            inner: Arc::default(),
        }
    }
}

impl<User: AuthUser> MemoryDirectory<User> {
    /// Creates a new directory sharing the provided map.
    ///
    /// ```rust
    /// use std::{collections::HashMap, sync::Arc};
    ///
    /// use api_auth::{memory_store::MemoryDirectory, PasswordUser};
    /// use tokio::{sync::RwLock, task};
    ///
    /// let inner = Arc::new(RwLock::new(HashMap::<String, PasswordUser>::new()));
    /// let directory: MemoryDirectory<PasswordUser> = MemoryDirectory::new(&inner);
    /// ```
    pub fn new(inner: &Arc<RwLock<HashMap<User::Id, User>>>) -> Self {
        Self {
            inner: inner.clone(),
        }
    }

    /// Inserts a user, replacing any user with the same ID.
    pub async fn insert(&self, user: User) {
        self.inner.write().await.insert(user.id(), user);
    }
}

impl MemoryDirectory<PasswordUser> {
    /// Registers a new user, hashing the provided password.
    ///
    /// Emails are unique: registering a taken email fails.
    #[tracing::instrument(level = "debug", skip(self, password), err)]
    pub async fn register_user(
        &self,
        email: &str,
        password: &str,
    ) -> Result<PasswordUser, RegisterError> {
        if self.email_taken(email).await {
            return Err(RegisterError::AlreadyExists(email.to_string()));
        }

        // Hashing is blocking and deliberately slow, so it runs off the
        // executor and without holding the lock.
        let (owned_email, password) = (email.to_owned(), password.to_owned());
        let user = task::spawn_blocking(move || PasswordUser::new(owned_email, &password)).await?;

        let mut users = self.inner.write().await;
        if users.values().any(|user| user.email == email) {
            return Err(RegisterError::AlreadyExists(email.to_string()));
        }
        users.insert(user.id(), user.clone());

        Ok(user)
    }

    async fn email_taken(&self, email: &str) -> bool {
        self.inner
            .read()
            .await
            .values()
            .any(|user| user.email == email)
    }
}

#[async_trait]
impl<User: AuthUser> UserDirectory for MemoryDirectory<User> {
    type User = User;
    type Error = Infallible;

    async fn find_by_field(
        &self,
        field: &str,
        value: &str,
    ) -> Result<Vec<Self::User>, Self::Error> {
        Ok(self
            .inner
            .read()
            .await
            .values()
            .filter(|user| user.field(field) == Some(value))
            .cloned()
            .collect())
    }

    async fn get_user(&self, user_id: &UserId<Self>) -> Result<Option<Self::User>, Self::Error> {
        Ok(self.inner.read().await.get(user_id).cloned())
    }
}
