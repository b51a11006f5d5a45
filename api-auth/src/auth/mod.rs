//! The authentication contract and its strategies.

use std::fmt::Debug;

use async_trait::async_trait;
use tokio::task;

pub use self::{
    basic::BasicAuth,
    session::{DbSessionAuth, ExpiringSessionAuth, MemorySessionAuth, SessionAuth},
};
use crate::{
    backend::UserId, basic::Credentials, path, session::SessionStore, AuthRequest, AuthUser,
    UserDirectory,
};

mod basic;
mod session;

/// Name of the header carrying credentials.
pub const AUTHORIZATION: &str = "Authorization";

/// Directory field credentials are looked up by unless configured
/// otherwise.
pub const DEFAULT_LOOKUP_FIELD: &str = "email";

/// An error type which maps directory and session store errors.
#[derive(thiserror::Error)]
pub enum Error<Directory, Sessions>
where
    Directory: UserDirectory,
    Sessions: SessionStore<UserId<Directory>>,
{
    /// A mapping to `Directory::Error`.
    #[error(transparent)]
    Directory(Directory::Error),

    /// A mapping to `Sessions::Error`.
    #[error(transparent)]
    Sessions(Sessions::Error),
}

impl<Directory, Sessions> Debug for Error<Directory, Sessions>
where
    Directory: UserDirectory,
    Sessions: SessionStore<UserId<Directory>>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Directory(err) => write!(f, "{:?}", err)?,
            Error::Sessions(err) => write!(f, "{:?}", err)?,
        };

        Ok(())
    }
}

/// A strategy which resolves the user behind a request.
///
/// Every method tolerates a missing request and answers with `None` (or
/// `false`) instead of failing: whether that means 401, 403, or something
/// else is left to the caller.
///
/// Only [`current_user`](Auth::current_user) must be provided. The other
/// methods have defaults that strategies may refine.
#[async_trait]
pub trait Auth: Clone + Send + Sync + 'static {
    /// The user type this strategy resolves.
    type User: AuthUser;

    /// Returns `true` when `path` must be authenticated.
    ///
    /// See [`path::require_auth`] for the matching rules.
    fn require_auth<P: AsRef<str>>(&self, path: Option<&str>, excluded_paths: Option<&[P]>) -> bool {
        path::require_auth(path, excluded_paths)
    }

    /// Returns the request's `Authorization` header.
    fn authorization_header<'r, R: AuthRequest>(&self, request: Option<&'r R>) -> Option<&'r str> {
        request?.header(AUTHORIZATION)
    }

    /// The name of the cookie carrying the session ID, if any.
    fn session_name(&self) -> Option<&str> {
        None
    }

    /// Returns the session ID cookie of the request.
    fn session_cookie<R: AuthRequest>(&self, request: Option<&R>) -> Option<String> {
        let name = self.session_name()?;
        request?.cookie(name)
    }

    /// Resolves the authenticated user for the request.
    async fn current_user<R>(&self, request: Option<&R>) -> Option<Self::User>
    where
        R: AuthRequest + Sync;
}

/// Looks up users whose `field` matches the credential identifier and
/// returns the first one whose secret verifies.
pub(crate) async fn authenticate<Directory: UserDirectory>(
    directory: &Directory,
    field: &str,
    creds: &Credentials,
) -> Result<Option<Directory::User>, Directory::Error> {
    let users = directory.find_by_field(field, &creds.identifier).await?;
    if users.is_empty() {
        return Ok(None);
    }

    // Verifying a secret is blocking and potentially slow, so we'll do so via
    // `spawn_blocking`.
    let secret = creds.secret.clone();
    let verified = task::spawn_blocking(move || {
        users.into_iter().find(|user| user.verify_secret(&secret))
    })
    .await;

    match verified {
        Ok(user) => Ok(user),
        Err(err) => {
            tracing::warn!(err = %err, "could not verify credentials");
            Ok(None)
        }
    }
}
