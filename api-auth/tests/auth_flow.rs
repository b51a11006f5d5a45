use api_auth::{
    session::{ExpiringSessionStore, MemorySessionStore},
    Auth, AuthContext, AuthGuardLayer, BasicAuth, Config, ExpiringSessionAuth, MemoryDirectory,
    MemorySessionAuth, PasswordUser, SessionAuth,
};
use axum::{
    body::{to_bytes, Body},
    extract::State,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, SET_COOKIE},
        request::Parts,
        Request, StatusCode,
    },
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Form, Router,
};
use serde::Deserialize;
use tower::ServiceExt;

const SESSION_NAME: &str = "_my_session_id";

const EXCLUDED_PATHS: [&str; 3] = [
    "/api/v1/status/",
    "/api/v1/auth_session/login/",
    "/api/v1/public*",
];

type Sessions = MemorySessionAuth<MemoryDirectory<PasswordUser>>;

#[derive(Deserialize)]
struct LoginForm {
    email: String,
    password: String,
}

async fn status() -> &'static str {
    "OK"
}

async fn me(AuthContext { user }: AuthContext<PasswordUser>) -> String {
    user.map(|user| user.email).unwrap_or_else(|| "anonymous".to_string())
}

async fn login<A>(State(auth): State<A>, Form(form): Form<LoginForm>) -> Response
where
    A: LoginAuth,
{
    match auth.sign_in(&form.email, &form.password).await {
        Some((user, session_id)) => (
            [(SET_COOKIE, format!("{SESSION_NAME}={session_id}; Path=/"))],
            user.email,
        )
            .into_response(),
        None => StatusCode::UNAUTHORIZED.into_response(),
    }
}

async fn logout<A>(State(auth): State<A>, req: Request<Body>) -> StatusCode
where
    A: LoginAuth,
{
    let (parts, _) = req.into_parts();
    if auth.sign_out(&parts).await {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

/// The session strategies under test, behind one interface for the routes.
#[async_trait::async_trait]
trait LoginAuth: Auth<User = PasswordUser> {
    async fn sign_in(&self, email: &str, password: &str) -> Option<(PasswordUser, String)>;

    async fn sign_out(&self, parts: &Parts) -> bool;
}

#[async_trait::async_trait]
impl LoginAuth for Sessions {
    async fn sign_in(&self, email: &str, password: &str) -> Option<(PasswordUser, String)> {
        SessionAuth::login(self, email, password).await
    }

    async fn sign_out(&self, parts: &Parts) -> bool {
        self.destroy_session(Some(parts)).await
    }
}

#[async_trait::async_trait]
impl LoginAuth for ExpiringSessionAuth<MemoryDirectory<PasswordUser>> {
    async fn sign_in(&self, email: &str, password: &str) -> Option<(PasswordUser, String)> {
        SessionAuth::login(self, email, password).await
    }

    async fn sign_out(&self, parts: &Parts) -> bool {
        self.destroy_session(Some(parts)).await
    }
}

fn session_app<A: LoginAuth>(auth: A) -> Router {
    Router::new()
        .route("/api/v1/status", get(status))
        .route("/api/v1/public/info", get(me))
        .route("/api/v1/users/me", get(me))
        .route("/api/v1/auth_session/login", post(login::<A>))
        .route("/api/v1/auth_session/logout", delete(logout::<A>))
        .layer(AuthGuardLayer::new(auth.clone()).with_excluded_paths(EXCLUDED_PATHS))
        .with_state(auth)
}

fn basic_app(auth: BasicAuth<MemoryDirectory<PasswordUser>>) -> Router {
    Router::new()
        .route("/api/v1/status", get(status))
        .route("/api/v1/users/me", get(me))
        .layer(AuthGuardLayer::new(auth).with_excluded_paths(EXCLUDED_PATHS))
}

async fn directory() -> MemoryDirectory<PasswordUser> {
    let directory = MemoryDirectory::<PasswordUser>::default();
    directory
        .register_user("bob@example.com", "hunter42")
        .await
        .unwrap();
    directory
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn with_cookie(uri: &str, method: &str, session_id: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(COOKIE, format!("{SESSION_NAME}={session_id}"))
        .body(Body::empty())
        .unwrap()
}

fn login_request(email: &str, password: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/auth_session/login")
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!("email={email}&password={password}")))
        .unwrap()
}

async fn body_string(res: Response) -> String {
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn session_id_from(res: &Response) -> String {
    let set_cookie = res.headers()[SET_COOKIE].to_str().unwrap();
    let cookie = cookie::Cookie::parse(set_cookie.to_owned()).unwrap();
    assert_eq!(cookie.name(), SESSION_NAME);
    cookie.value().to_owned()
}

#[tokio::test]
async fn basic_auth_resolves_user() {
    let directory = MemoryDirectory::<PasswordUser>::default();
    directory.insert(PasswordUser::new("gui", "pass")).await;
    let app = basic_app(BasicAuth::new(directory));

    // "gui:pass"
    let req = Request::builder()
        .uri("/api/v1/users/me")
        .header(AUTHORIZATION, "Basic Z3VpOnBhc3M=")
        .body(Body::empty())
        .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_string(res).await, "gui");

    // "gui:wrong"
    let req = Request::builder()
        .uri("/api/v1/users/me")
        .header(AUTHORIZATION, "Basic Z3VpOndyb25n")
        .body(Body::empty())
        .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = app.oneshot(get_request("/api/v1/users/me")).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn excluded_paths_are_open() {
    let config = Config::default().with_session_name(SESSION_NAME);
    let auth: Sessions =
        SessionAuth::from_config(directory().await, MemorySessionStore::new(), &config);
    let app = session_app(auth);

    let res = app.clone().oneshot(get_request("/api/v1/status")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_string(res).await, "OK");

    let res = app
        .clone()
        .oneshot(get_request("/api/v1/public/info"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_string(res).await, "anonymous");

    let res = app.oneshot(get_request("/api/v1/users/me")).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn session_login_and_logout() {
    let config = Config::default().with_session_name(SESSION_NAME);
    let auth: Sessions =
        SessionAuth::from_config(directory().await, MemorySessionStore::new(), &config);
    let app = session_app(auth);

    let res = app
        .clone()
        .oneshot(login_request("bob@example.com", "bogus"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = app
        .clone()
        .oneshot(login_request("bob@example.com", "hunter42"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let session_id = session_id_from(&res);

    let res = app
        .clone()
        .oneshot(with_cookie("/api/v1/users/me", "GET", &session_id))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_string(res).await, "bob@example.com");

    // A forged session ID is carried but resolves to no one.
    let res = app
        .clone()
        .oneshot(with_cookie("/api/v1/users/me", "GET", "forged"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = app
        .clone()
        .oneshot(with_cookie("/api/v1/auth_session/logout", "DELETE", &session_id))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = app
        .clone()
        .oneshot(with_cookie("/api/v1/users/me", "GET", &session_id))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // The session is gone, so logging out again is forbidden by the guard.
    let res = app
        .oneshot(with_cookie("/api/v1/auth_session/logout", "DELETE", &session_id))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn expiring_sessions_from_config() {
    let config = Config::from_lookup(|name| match name {
        "SESSION_DURATION" => Some("3600".to_string()),
        "SESSION_NAME" => Some(SESSION_NAME.to_string()),
        _ => None,
    });
    let auth: ExpiringSessionAuth<_> = SessionAuth::from_config(
        directory().await,
        ExpiringSessionStore::from_config(&config),
        &config,
    );
    assert_eq!(auth.sessions().session_duration(), 3600);
    let app = session_app(auth);

    let res = app
        .clone()
        .oneshot(login_request("bob@example.com", "hunter42"))
        .await
        .unwrap();
    let session_id = session_id_from(&res);

    let res = app
        .oneshot(with_cookie("/api/v1/users/me", "GET", &session_id))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_string(res).await, "bob@example.com");
}

#[tokio::test]
async fn session_cookie_without_name_is_unauthorized() {
    // Without a configured cookie name, session cookies are never read.
    let auth: Sessions = SessionAuth::new(directory().await, MemorySessionStore::new());
    let app = session_app(auth.clone());

    let (_, session_id) = auth.login("bob@example.com", "hunter42").await.unwrap();

    let res = app
        .oneshot(with_cookie("/api/v1/users/me", "GET", &session_id))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}
