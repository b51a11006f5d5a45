use std::{
    fmt::{Debug, Display},
    hash::Hash,
};

use async_trait::async_trait;

/// Type alias for a directory user's ID.
pub type UserId<Directory> = <<Directory as UserDirectory>::User as AuthUser>::Id;

/// A user which can be identified, looked up, and verified.
///
/// # Examples
///
/// ```rust
/// use api_auth::AuthUser;
///
/// #[derive(Debug, Clone)]
/// struct User {
///     id: i64,
///     email: String,
///     secret: String,
/// }
///
/// impl AuthUser for User {
///     type Id = i64;
///
///     fn id(&self) -> Self::Id {
///         self.id
///     }
///
///     fn field(&self, name: &str) -> Option<&str> {
///         (name == "email").then_some(self.email.as_str())
///     }
///
///     fn verify_secret(&self, secret: &str) -> bool {
///         self.secret == secret
///     }
/// }
/// ```
pub trait AuthUser: Debug + Clone + Send + Sync + 'static {
    /// An identifying feature of the user.
    type Id: Debug + Display + Clone + Eq + Hash + Send + Sync + 'static;

    /// Returns some identifying feature of the user.
    fn id(&self) -> Self::Id;

    /// Returns the value of a searchable field, e.g. `"email"`.
    ///
    /// Fields that don't exist return `None` and never match a search.
    fn field(&self, name: &str) -> Option<&str>;

    /// Returns `true` when `secret` is this user's secret.
    ///
    /// Implementations should compare against a stored hash, never a
    /// plaintext secret.
    fn verify_secret(&self, secret: &str) -> bool;
}

/// A queryable collection of users.
///
/// The directory is only ever read: users are created and persisted
/// elsewhere.
#[async_trait]
pub trait UserDirectory: Clone + Send + Sync + 'static {
    /// User type held by the directory.
    type User: AuthUser;

    /// An error which can occur while querying the directory.
    type Error: std::error::Error + Send + Sync;

    /// Returns every user whose `field` equals `value`.
    async fn find_by_field(&self, field: &str, value: &str)
        -> Result<Vec<Self::User>, Self::Error>;

    /// Gets the user by provided ID.
    async fn get_user(
        &self,
        user_id: &UserId<Self>,
    ) -> Result<Option<Self::User>, Self::Error>;
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, convert::Infallible};

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct TestUser {
        id: i64,
        email: String,
        secret: String,
    }

    impl AuthUser for TestUser {
        type Id = i64;

        fn id(&self) -> Self::Id {
            self.id
        }

        fn field(&self, name: &str) -> Option<&str> {
            match name {
                "email" => Some(&self.email),
                _ => None,
            }
        }

        fn verify_secret(&self, secret: &str) -> bool {
            self.secret == secret
        }
    }

    #[derive(Clone, Default)]
    struct TestDirectory {
        users: HashMap<i64, TestUser>,
    }

    #[async_trait]
    impl UserDirectory for TestDirectory {
        type User = TestUser;
        type Error = Infallible;

        async fn find_by_field(
            &self,
            field: &str,
            value: &str,
        ) -> Result<Vec<Self::User>, Self::Error> {
            Ok(self
                .users
                .values()
                .filter(|user| user.field(field) == Some(value))
                .cloned()
                .collect())
        }

        async fn get_user(
            &self,
            user_id: &UserId<Self>,
        ) -> Result<Option<Self::User>, Self::Error> {
            Ok(self.users.get(user_id).cloned())
        }
    }

    fn directory() -> TestDirectory {
        let mut directory = TestDirectory::default();
        directory.users.insert(
            1,
            TestUser {
                id: 1,
                email: "ferris@example.com".to_string(),
                secret: "hunter42".to_string(),
            },
        );
        directory
    }

    #[tokio::test]
    async fn test_find_by_field() {
        let directory = directory();

        let found = directory
            .find_by_field("email", "ferris@example.com")
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert!(found[0].verify_secret("hunter42"));
        assert!(!found[0].verify_secret("bogus"));

        assert!(directory
            .find_by_field("email", "nobody@example.com")
            .await
            .unwrap()
            .is_empty());
        assert!(directory
            .find_by_field("nickname", "ferris@example.com")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_get_user() {
        let directory = directory();

        assert_eq!(directory.get_user(&1).await.unwrap().map(|u| u.id), Some(1));
        assert!(directory.get_user(&2).await.unwrap().is_none());
    }
}
