use async_trait::async_trait;

use super::{authenticate, Auth, Error, DEFAULT_LOOKUP_FIELD};
use crate::{
    backend::UserId,
    basic::Credentials,
    session::{DbSessionStore, ExpiringSessionStore, MemorySessionStore, SessionStore},
    AuthRequest, AuthUser, Config, UserDirectory,
};

/// Session authentication with sessions held in process memory.
pub type MemorySessionAuth<Directory> =
    SessionAuth<Directory, MemorySessionStore<UserId<Directory>>>;

/// Session authentication with expiring sessions held in process memory.
pub type ExpiringSessionAuth<Directory> =
    SessionAuth<Directory, ExpiringSessionStore<UserId<Directory>>>;

/// Session authentication with sessions persisted as durable records.
pub type DbSessionAuth<Directory, Records> =
    SessionAuth<Directory, DbSessionStore<UserId<Directory>, Records>>;

/// Authentication via a session ID cookie.
///
/// Route handlers create a session once a user has logged in and hand its
/// ID to the client as a cookie. Later requests are authenticated by
/// resolving that cookie through the session store and fetching the user
/// from the directory.
///
/// The session store decides how sessions are kept and when they expire;
/// see [`MemorySessionAuth`], [`ExpiringSessionAuth`], and
/// [`DbSessionAuth`].
#[derive(Debug, Clone)]
pub struct SessionAuth<Directory, Sessions> {
    directory: Directory,
    sessions: Sessions,
    session_name: Option<String>,
    lookup_field: &'static str,
}

impl<Directory, Sessions> SessionAuth<Directory, Sessions>
where
    Directory: UserDirectory,
    Sessions: SessionStore<UserId<Directory>>,
{
    /// Creates a strategy without a session cookie name.
    ///
    /// Until a name is set with
    /// [`with_session_name`](Self::with_session_name) no request carries a
    /// session.
    pub fn new(directory: Directory, sessions: Sessions) -> Self {
        Self {
            directory,
            sessions,
            session_name: None,
            lookup_field: DEFAULT_LOOKUP_FIELD,
        }
    }

    /// Creates a strategy using the configured session cookie name.
    pub fn from_config(directory: Directory, sessions: Sessions, config: &Config) -> Self {
        Self {
            session_name: config.session_name.clone(),
            ..Self::new(directory, sessions)
        }
    }

    /// Sets the name of the cookie carrying the session ID.
    pub fn with_session_name(mut self, name: impl Into<String>) -> Self {
        self.session_name = Some(name.into());
        self
    }

    /// Sets the directory field login identifiers are matched against.
    pub fn with_lookup_field(mut self, field: &'static str) -> Self {
        self.lookup_field = field;
        self
    }

    /// The user directory.
    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    /// The session store.
    pub fn sessions(&self) -> &Sessions {
        &self.sessions
    }

    /// Creates a session for the user, surfacing store errors.
    pub async fn try_create_session(
        &self,
        user_id: &UserId<Directory>,
    ) -> Result<Option<String>, Error<Directory, Sessions>> {
        self.sessions
            .create_session(user_id)
            .await
            .map_err(Error::Sessions)
    }

    /// Creates a session for the user and returns its ID.
    ///
    /// Store errors are logged and reported as `None`.
    #[tracing::instrument(level = "debug", skip_all, fields(user.id = %user_id))]
    pub async fn create_session(&self, user_id: &UserId<Directory>) -> Option<String> {
        match self.try_create_session(user_id).await {
            Ok(session_id) => session_id,
            Err(err) => {
                tracing::warn!(err = %err, "could not create session");
                None
            }
        }
    }

    /// Resolves a session ID to the user ID it belongs to.
    ///
    /// A missing, unknown, or expired session ID resolves to `None`, as does
    /// any store error.
    pub async fn user_id_for_session_id(
        &self,
        session_id: Option<&str>,
    ) -> Option<UserId<Directory>> {
        match self.sessions.user_id_for_session_id(session_id?).await {
            Ok(user_id) => user_id,
            Err(err) => {
                tracing::warn!(err = %err, "could not resolve session");
                None
            }
        }
    }

    /// Destroys the session named by the request's session cookie.
    ///
    /// Returns `true` only when a session was found and removed.
    #[tracing::instrument(level = "debug", skip_all, ret)]
    pub async fn destroy_session<R>(&self, request: Option<&R>) -> bool
    where
        R: AuthRequest + Sync,
    {
        let Some(session_id) = self.session_cookie(request) else {
            return false;
        };

        match self.sessions.destroy_session(&session_id).await {
            Ok(destroyed) => destroyed,
            Err(err) => {
                tracing::warn!(err = %err, "could not destroy session");
                false
            }
        }
    }

    /// Verifies the credentials and creates a session for the user they
    /// belong to.
    ///
    /// Returns the user and the new session ID, or `None` when the
    /// credentials don't verify or no session could be created.
    #[tracing::instrument(level = "debug", skip_all, fields(user.id))]
    pub async fn login(
        &self,
        identifier: &str,
        secret: &str,
    ) -> Option<(Directory::User, String)> {
        let creds = Credentials {
            identifier: identifier.to_owned(),
            secret: secret.to_owned(),
        };

        let user = match authenticate(&self.directory, self.lookup_field, &creds).await {
            Ok(user) => user?,
            Err(err) => {
                tracing::warn!(err = %err, "could not look up user from credentials");
                return None;
            }
        };
        tracing::Span::current().record("user.id", user.id().to_string());

        let session_id = self.create_session(&user.id()).await?;

        Some((user, session_id))
    }

    /// Resolves the authenticated user for the request, surfacing errors.
    pub async fn try_current_user<R>(
        &self,
        request: Option<&R>,
    ) -> Result<Option<Directory::User>, Error<Directory, Sessions>>
    where
        R: AuthRequest + Sync,
    {
        let Some(session_id) = self.session_cookie(request) else {
            return Ok(None);
        };

        let Some(user_id) = self
            .sessions
            .user_id_for_session_id(&session_id)
            .await
            .map_err(Error::Sessions)?
        else {
            return Ok(None);
        };

        self.directory
            .get_user(&user_id)
            .await
            .map_err(Error::Directory)
    }
}

#[async_trait]
impl<Directory, Sessions> Auth for SessionAuth<Directory, Sessions>
where
    Directory: UserDirectory,
    Sessions: SessionStore<UserId<Directory>>,
{
    type User = Directory::User;

    fn session_name(&self) -> Option<&str> {
        self.session_name.as_deref()
    }

    #[tracing::instrument(level = "debug", skip_all, fields(user.id))]
    async fn current_user<R>(&self, request: Option<&R>) -> Option<Self::User>
    where
        R: AuthRequest + Sync,
    {
        match self.try_current_user(request).await {
            Ok(Some(user)) => {
                tracing::Span::current().record("user.id", user.id().to_string());
                Some(user)
            }
            Ok(None) => None,
            Err(err) => {
                tracing::warn!(err = %err, "could not resolve current user");
                None
            }
        }
    }
}
