use std::fmt::Debug;

use async_trait::async_trait;

use super::{
    is_live, ExpiringSessionStore, RecordField, SessionRecordStore, SessionStore, UserSession,
};
use crate::Config;

/// A session store backed by durable [`UserSession`] records.
///
/// Session IDs and creation times come from an [`ExpiringSessionStore`],
/// but sessions are only persisted as records. Lookups and removals only
/// consult the records, so sessions survive process restarts for as long as
/// the records do. The expiring store's duration and clock decide when a
/// record has expired.
///
/// As with [`ExpiringSessionStore`], a duration of zero or less disables
/// expiration. Records are therefore not expired immediately under an
/// unset `SESSION_DURATION`.
///
/// Query failures while resolving or destroying a session are logged and
/// reported as "no session", never as errors.
#[derive(Debug)]
pub struct DbSessionStore<Id, Records> {
    base: ExpiringSessionStore<Id>,
    records: Records,
}

impl<Id, Records: Clone> Clone for DbSessionStore<Id, Records> {
    fn clone(&self) -> Self {
        Self {
            base: self.base.clone(),
            records: self.records.clone(),
        }
    }
}

impl<Id, Records> DbSessionStore<Id, Records> {
    /// Creates a store over `records` wrapping the provided expiring store.
    pub fn new(base: ExpiringSessionStore<Id>, records: Records) -> Self {
        Self { base, records }
    }

    /// Creates a store over `records` using the configured session
    /// duration.
    pub fn from_config(config: &Config, records: Records) -> Self {
        Self::new(ExpiringSessionStore::from_config(config), records)
    }

    /// The configured session lifetime in seconds.
    pub fn session_duration(&self) -> i64 {
        self.base.session_duration()
    }

    /// The underlying record store.
    pub fn records(&self) -> &Records {
        &self.records
    }
}

impl<Id, Records> DbSessionStore<Id, Records>
where
    Id: Send + Sync + 'static,
    Records: SessionRecordStore<Id>,
{
    async fn find_session(&self, session_id: &str) -> Option<UserSession<Id>> {
        match self
            .records
            .find_matching(RecordField::SessionId, session_id)
            .await
        {
            Ok(sessions) => sessions.into_iter().next(),
            Err(err) => {
                tracing::warn!(err = %err, "could not query session records");
                None
            }
        }
    }
}

#[async_trait]
impl<Id, Records> SessionStore<Id> for DbSessionStore<Id, Records>
where
    Id: Debug + Clone + Send + Sync + 'static,
    Records: SessionRecordStore<Id>,
{
    type Error = Records::Error;

    #[tracing::instrument(level = "debug", skip_all, err)]
    async fn create_session(&self, user_id: &Id) -> Result<Option<String>, Self::Error> {
        // Only the record is written; the expiring store's own map is never
        // consulted here.
        let (session_id, created_at) = self.base.issue();

        let record = UserSession {
            user_id: user_id.clone(),
            session_id: session_id.clone(),
            created_at,
        };
        self.records.insert(&record).await?;

        Ok(Some(session_id))
    }

    async fn user_id_for_session_id(&self, session_id: &str) -> Result<Option<Id>, Self::Error> {
        let Some(session) = self.find_session(session_id).await else {
            return Ok(None);
        };

        if !is_live(session.created_at, self.session_duration(), self.base.now()) {
            return Ok(None);
        }

        Ok(Some(session.user_id))
    }

    #[tracing::instrument(level = "debug", skip_all, ret)]
    async fn destroy_session(&self, session_id: &str) -> Result<bool, Self::Error> {
        let Some(session) = self.find_session(session_id).await else {
            return Ok(false);
        };

        if let Err(err) = self.records.remove(&session).await {
            tracing::warn!(err = %err, "could not remove session record");
            return Ok(false);
        }

        Ok(true)
    }
}
