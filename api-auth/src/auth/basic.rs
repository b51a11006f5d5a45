use async_trait::async_trait;

use super::{authenticate, Auth, DEFAULT_LOOKUP_FIELD};
use crate::{basic, basic::Credentials, AuthRequest, AuthUser, UserDirectory};

/// Authentication via the `Basic` scheme of the `Authorization` header.
///
/// Each request carries base64-encoded `identifier:secret` credentials. The
/// identifier is looked up in the directory and the first matching user
/// whose secret verifies is the current user.
#[derive(Debug, Clone)]
pub struct BasicAuth<Directory> {
    directory: Directory,
    lookup_field: &'static str,
}

impl<Directory: UserDirectory> BasicAuth<Directory> {
    /// Creates a strategy looking users up by `email`.
    pub fn new(directory: Directory) -> Self {
        Self {
            directory,
            lookup_field: DEFAULT_LOOKUP_FIELD,
        }
    }

    /// Sets the directory field identifiers are matched against.
    pub fn with_lookup_field(mut self, field: &'static str) -> Self {
        self.lookup_field = field;
        self
    }

    /// The user directory.
    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    /// Returns the base64 token of a `Basic` authorization header.
    pub fn extract_base64_authorization_header<'h>(&self, header: Option<&'h str>) -> Option<&'h str> {
        basic::extract_base64_authorization_header(header)
    }

    /// Decodes a base64 token into UTF-8 text.
    pub fn decode_base64_authorization_header(&self, token: Option<&str>) -> Option<String> {
        basic::decode_base64_authorization_header(token)
    }

    /// Splits decoded text into credentials at the first colon.
    pub fn extract_user_credentials(&self, decoded: Option<&str>) -> Option<Credentials> {
        basic::extract_user_credentials(decoded)
    }

    /// Returns the user the credentials belong to, surfacing directory
    /// errors.
    pub async fn try_user_object_from_credentials(
        &self,
        creds: &Credentials,
    ) -> Result<Option<Directory::User>, Directory::Error> {
        authenticate(&self.directory, self.lookup_field, creds).await
    }

    /// Returns the user the credentials belong to.
    ///
    /// Directory errors are logged and treated as "no user".
    pub async fn user_object_from_credentials(&self, creds: &Credentials) -> Option<Directory::User> {
        match self.try_user_object_from_credentials(creds).await {
            Ok(user) => user,
            Err(err) => {
                tracing::warn!(err = %err, "could not look up user from credentials");
                None
            }
        }
    }
}

#[async_trait]
impl<Directory: UserDirectory> Auth for BasicAuth<Directory> {
    type User = Directory::User;

    #[tracing::instrument(level = "debug", skip_all, fields(user.id))]
    async fn current_user<R>(&self, request: Option<&R>) -> Option<Self::User>
    where
        R: AuthRequest + Sync,
    {
        let header = self.authorization_header(request);
        let token = self.extract_base64_authorization_header(header);
        let decoded = self.decode_base64_authorization_header(token)?;
        let creds = self.extract_user_credentials(Some(&decoded))?;

        let user = self.user_object_from_credentials(&creds).await?;
        tracing::Span::current().record("user.id", user.id().to_string());

        Some(user)
    }
}
