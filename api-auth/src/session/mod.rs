//! Session stores mapping opaque session IDs to user IDs.
//!
//! Three flavors share the [`SessionStore`] contract:
//!
//! - [`MemorySessionStore`], a plain shared map,
//! - [`ExpiringSessionStore`], a shared map whose entries expire after a
//!   configured duration,
//! - [`DbSessionStore`], which layers durable [`UserSession`] records over
//!   the expiring store and resolves sessions from those records.

use std::{fmt::Debug, sync::Arc};

use async_trait::async_trait;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

pub use self::{
    db::DbSessionStore,
    expiring::ExpiringSessionStore,
    memory::MemorySessionStore,
    records::{MemoryRecordStore, RecordField, SessionRecordStore, UserSession},
};
#[cfg(feature = "sqlite")]
pub use self::sqlite_store::SqliteRecordStore;

mod db;
mod expiring;
mod memory;
mod records;
#[cfg(feature = "sqlite")]
mod sqlite_store;

/// A source of the current time.
pub type Clock = Arc<dyn Fn() -> OffsetDateTime + Send + Sync>;

pub(crate) fn system_clock() -> Clock {
    Arc::new(OffsetDateTime::now_utc)
}

pub(crate) fn generate_session_id() -> String {
    Uuid::new_v4().to_string()
}

/// Returns `true` when a session created at `created_at` is still valid at
/// `now` for a lifetime of `duration_secs`.
///
/// A lifetime of zero or less never expires. The session is still valid at
/// the exact instant of expiry and invalid any time after it. A lifetime
/// too large to represent never expires either.
pub fn is_live(created_at: OffsetDateTime, duration_secs: i64, now: OffsetDateTime) -> bool {
    if duration_secs <= 0 {
        return true;
    }

    match created_at.checked_add(Duration::seconds(duration_secs)) {
        Some(expires_at) => expires_at >= now,
        None => true,
    }
}

/// A store which creates, resolves, and destroys sessions.
///
/// Stores are cheap to clone and clones share state, so a single store can
/// be handed to every request handler.
#[async_trait]
pub trait SessionStore<Id>: Clone + Send + Sync + 'static
where
    Id: Debug + Clone + Send + Sync + 'static,
{
    /// An error which can occur in the store's backing storage.
    type Error: std::error::Error + Send + Sync;

    /// Creates a session for the user and returns its ID.
    ///
    /// `None` means no session was created.
    async fn create_session(&self, user_id: &Id) -> Result<Option<String>, Self::Error>;

    /// Resolves a session ID to its user ID, if the session exists and is
    /// still valid.
    async fn user_id_for_session_id(&self, session_id: &str) -> Result<Option<Id>, Self::Error>;

    /// Removes a session, returning `true` when a valid session was removed.
    async fn destroy_session(&self, session_id: &str) -> Result<bool, Self::Error>;
}
