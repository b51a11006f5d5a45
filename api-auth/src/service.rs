use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use axum::http::{self, Request, Response};
use tower_layer::Layer;
use tower_service::Service;
use tracing::Instrument;

use crate::{Auth, AuthContext, AuthUser};

/// A middleware that authenticates requests before they reach the inner
/// service.
///
/// Paths excluded from authentication are forwarded with an empty
/// [`AuthContext`]. Other requests are answered with `401 Unauthorized` when
/// they carry neither an `Authorization` header nor a session cookie, and
/// with `403 Forbidden` when no user can be resolved from what they do
/// carry. Authenticated requests are forwarded with the user in their
/// [`AuthContext`].
#[derive(Debug, Clone)]
pub struct AuthGuard<S, A> {
    inner: S,
    auth: A,
    excluded_paths: Arc<[String]>,
}

impl<S, A: Auth> AuthGuard<S, A> {
    /// Create a new [`AuthGuard`] with the provided strategy.
    pub fn new(inner: S, auth: A, excluded_paths: Arc<[String]>) -> Self {
        Self {
            inner,
            auth,
            excluded_paths,
        }
    }
}

fn status_response<ResBody: Default>(status: http::StatusCode) -> Response<ResBody> {
    let mut res = Response::default();
    *res.status_mut() = status;
    res
}

impl<ReqBody, ResBody, S, A> Service<Request<ReqBody>> for AuthGuard<S, A>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    ReqBody: Send + 'static,
    ResBody: Default + Send,
    A: Auth,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    #[inline]
    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let span = tracing::info_span!(
            "call",
            path = %req.uri().path(),
            user.id = tracing::field::Empty
        );

        let auth = self.auth.clone();
        let excluded_paths = self.excluded_paths.clone();

        // Only the ready service may be called, so it's swapped out for a
        // clone.
        //
        // See: https://docs.rs/tower/latest/tower/trait.Service.html#be-careful-when-cloning-inner-services
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(
            async move {
                // The body needn't be `Sync`, so only the parts are handed
                // to the strategy.
                let (mut parts, body) = req.into_parts();

                if !auth.require_auth(Some(parts.uri.path()), Some(&excluded_paths[..])) {
                    parts
                        .extensions
                        .insert(AuthContext::<A::User> { user: None });
                    return inner.call(Request::from_parts(parts, body)).await;
                }

                if auth.authorization_header(Some(&parts)).is_none()
                    && auth.session_cookie(Some(&parts)).is_none()
                {
                    tracing::debug!("request carries no credentials");
                    return Ok(status_response(http::StatusCode::UNAUTHORIZED));
                }

                let Some(user) = auth.current_user(Some(&parts)).await else {
                    tracing::debug!("credentials did not resolve to a user");
                    return Ok(status_response(http::StatusCode::FORBIDDEN));
                };

                tracing::Span::current().record("user.id", user.id().to_string());
                parts.extensions.insert(AuthContext { user: Some(user) });

                inner.call(Request::from_parts(parts, body)).await
            }
            .instrument(span),
        )
    }
}

/// A layer for guarding routes with an [`Auth`] strategy.
///
/// ```rust
/// use api_auth::{AuthGuardLayer, BasicAuth, MemoryDirectory, PasswordUser};
///
/// let auth = BasicAuth::new(MemoryDirectory::<PasswordUser>::default());
/// let layer = AuthGuardLayer::new(auth)
///     .with_excluded_paths(["/api/v1/status/", "/api/v1/auth_session/login/"]);
/// ```
#[derive(Debug, Clone)]
pub struct AuthGuardLayer<A> {
    auth: A,
    excluded_paths: Arc<[String]>,
}

impl<A: Auth> AuthGuardLayer<A> {
    /// Create a new [`AuthGuardLayer`] guarding every path.
    pub fn new(auth: A) -> Self {
        Self {
            auth,
            excluded_paths: Arc::from(Vec::new()),
        }
    }

    /// Sets the paths that may be accessed without authentication.
    ///
    /// Patterns follow [`require_auth`](crate::path::require_auth).
    pub fn with_excluded_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        self.excluded_paths = paths.into_iter().map(Into::into).collect();
        self
    }
}

impl<S, A: Auth> Layer<S> for AuthGuardLayer<A> {
    type Service = AuthGuard<S, A>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthGuard::new(inner, self.auth.clone(), self.excluded_paths.clone())
    }
}
