use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};

use crate::AuthUser;

/// The authentication outcome for a request, provided by
/// [`AuthGuardLayer`](crate::AuthGuardLayer).
///
/// `user` is `None` only on paths excluded from authentication.
#[derive(Debug, Clone)]
pub struct AuthContext<User> {
    /// The authenticated user, if any.
    pub user: Option<User>,
}

#[async_trait]
impl<S, User> FromRequestParts<S> for AuthContext<User>
where
    S: Send + Sync,
    User: AuthUser,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<AuthContext<_>>().cloned().ok_or((
            StatusCode::INTERNAL_SERVER_ERROR,
            "Can't extract auth context. Is `AuthGuardLayer` enabled?",
        ))
    }
}
