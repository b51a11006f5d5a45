//! Basic and session-based authentication for web APIs.
//!
//! This crate resolves the user behind an incoming request. Two strategies
//! implement the common [`Auth`] contract:
//!
//! 1. [`BasicAuth`] reads `identifier:secret` credentials from a `Basic`
//!    `Authorization` header and verifies them against a [`UserDirectory`],
//! 2. [`SessionAuth`] reads a session ID from a named cookie and resolves it
//!    through a [`SessionStore`](session::SessionStore).
//!
//! Every part of the contract fails closed: malformed headers, unknown or
//! expired sessions, and storage failures all resolve to "no user" rather
//! than to an error. Deciding what that means for a response is left to the
//! caller, or to [`AuthGuardLayer`] which answers with `401` or `403`.
//!
//! # Users
//!
//! Any type implementing [`AuthUser`] may be authenticated. [`PasswordUser`]
//! is provided for the common case of an email and a password hash.
//!
//! # Sessions
//!
//! Three session stores are provided:
//!
//! - [`MemorySessionStore`](session::MemorySessionStore) keeps sessions until
//!   they are destroyed,
//! - [`ExpiringSessionStore`](session::ExpiringSessionStore) additionally
//!   expires them after the configured [`Config::session_duration`],
//! - [`DbSessionStore`](session::DbSessionStore) persists them as records so
//!   they outlive the process. A SQLite record store is available with the
//!   `sqlite` feature.
//!
//! # Example
//!
//! ```rust,no_run
//! use api_auth::{
//!     session::MemorySessionStore, AuthContext, AuthGuardLayer, Config, MemoryDirectory,
//!     MemorySessionAuth, PasswordUser, SessionAuth,
//! };
//! use axum::{routing::get, Router};
//!
//! async fn me(AuthContext { user }: AuthContext<PasswordUser>) -> String {
//!     user.map(|user| user.email).unwrap_or_default()
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let directory = MemoryDirectory::<PasswordUser>::default();
//!     directory
//!         .register_user("bob@example.com", "hunter42")
//!         .await
//!         .unwrap();
//!
//!     let config = Config::from_env();
//!     let auth: MemorySessionAuth<_> =
//!         SessionAuth::from_config(directory, MemorySessionStore::new(), &config);
//!
//!     let app = Router::new()
//!         .route("/api/v1/users/me", get(me))
//!         .route("/api/v1/status", get(|| async { "OK" }))
//!         .layer(AuthGuardLayer::new(auth).with_excluded_paths(["/api/v1/status/"]));
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```
#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub use crate::{
    auth::{
        Auth, BasicAuth, DbSessionAuth, Error, ExpiringSessionAuth, MemorySessionAuth, SessionAuth,
    },
    backend::{AuthUser, UserDirectory, UserId},
    config::Config,
    extract::AuthContext,
    memory_store::MemoryDirectory,
    request::AuthRequest,
    service::{AuthGuard, AuthGuardLayer},
    user::PasswordUser,
};

pub mod auth;
pub mod basic;
pub mod config;
pub mod memory_store;
pub mod path;
pub mod session;

mod backend;
mod extract;
mod request;
mod service;
mod user;
