use std::{collections::HashMap, convert::Infallible, fmt::Debug, sync::Arc};

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use super::{generate_session_id, is_live, system_clock, Clock, SessionStore};
use crate::Config;

#[derive(Debug, Clone)]
struct Entry<Id> {
    user_id: Id,
    created_at: OffsetDateTime,
}

/// A session store held in process memory whose sessions expire.
///
/// Each session remembers when it was created. Once `session_duration`
/// seconds have passed the session no longer resolves. A duration of zero
/// or less disables expiration.
pub struct ExpiringSessionStore<Id> {
    inner: Arc<RwLock<HashMap<String, Entry<Id>>>>,
    session_duration: i64,
    clock: Clock,
}

impl<Id> Clone for ExpiringSessionStore<Id> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            session_duration: self.session_duration,
            clock: self.clock.clone(),
        }
    }
}

impl<Id> Debug for ExpiringSessionStore<Id> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpiringSessionStore")
            .field("session_duration", &self.session_duration)
            .finish_non_exhaustive()
    }
}

impl<Id> ExpiringSessionStore<Id> {
    /// Creates an empty store with a lifetime of `session_duration` seconds.
    pub fn new(session_duration: i64) -> Self {
        Self {
            inner: Arc::default(),
            session_duration,
            clock: system_clock(),
        }
    }

    /// Creates an empty store using the configured session duration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.session_duration)
    }

    /// Replaces the source of the current time.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// The configured session lifetime in seconds.
    pub fn session_duration(&self) -> i64 {
        self.session_duration
    }

    /// The number of sessions currently held, expired ones included.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Returns `true` when no sessions are held.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    pub(crate) fn now(&self) -> OffsetDateTime {
        (self.clock)()
    }

    /// Generates a session ID along with its creation time.
    pub(crate) fn issue(&self) -> (String, OffsetDateTime) {
        (generate_session_id(), self.now())
    }

    fn is_live(&self, created_at: OffsetDateTime) -> bool {
        is_live(created_at, self.session_duration, self.now())
    }
}

#[async_trait]
impl<Id> SessionStore<Id> for ExpiringSessionStore<Id>
where
    Id: Debug + Clone + Send + Sync + 'static,
{
    type Error = Infallible;

    async fn create_session(&self, user_id: &Id) -> Result<Option<String>, Self::Error> {
        let (session_id, created_at) = self.issue();
        let entry = Entry {
            user_id: user_id.clone(),
            created_at,
        };
        self.inner.write().await.insert(session_id.clone(), entry);

        Ok(Some(session_id))
    }

    async fn user_id_for_session_id(&self, session_id: &str) -> Result<Option<Id>, Self::Error> {
        {
            let sessions = self.inner.read().await;
            match sessions.get(session_id) {
                None => return Ok(None),
                Some(entry) if self.is_live(entry.created_at) => {
                    return Ok(Some(entry.user_id.clone()))
                }
                Some(_) => {}
            }
        }

        // The session has expired: evict it, unless it was replaced while
        // the lock was released.
        let mut sessions = self.inner.write().await;
        if sessions
            .get(session_id)
            .is_some_and(|entry| !self.is_live(entry.created_at))
        {
            sessions.remove(session_id);
            tracing::debug!("evicted expired session");
        }

        Ok(None)
    }

    async fn destroy_session(&self, session_id: &str) -> Result<bool, Self::Error> {
        let removed = self.inner.write().await.remove(session_id);

        // Expired sessions are removed too, but don't count as destroyed.
        Ok(removed.is_some_and(|entry| self.is_live(entry.created_at)))
    }
}
