use std::{collections::HashMap, convert::Infallible, fmt::Debug, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{generate_session_id, SessionStore};

/// A session store held in process memory.
///
/// Sessions never expire and are lost when the process exits.
#[derive(Debug)]
pub struct MemorySessionStore<Id> {
    inner: Arc<RwLock<HashMap<String, Id>>>,
}

impl<Id> Clone for MemorySessionStore<Id> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<Id> Default for MemorySessionStore<Id> {
    fn default() -> Self {
        Self {
            inner: Arc::default(),
        }
    }
}

impl<Id> MemorySessionStore<Id> {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl<Id> SessionStore<Id> for MemorySessionStore<Id>
where
    Id: Debug + Clone + Send + Sync + 'static,
{
    type Error = Infallible;

    async fn create_session(&self, user_id: &Id) -> Result<Option<String>, Self::Error> {
        let session_id = generate_session_id();
        self.inner
            .write()
            .await
            .insert(session_id.clone(), user_id.clone());

        Ok(Some(session_id))
    }

    async fn user_id_for_session_id(&self, session_id: &str) -> Result<Option<Id>, Self::Error> {
        Ok(self.inner.read().await.get(session_id).cloned())
    }

    async fn destroy_session(&self, session_id: &str) -> Result<bool, Self::Error> {
        Ok(self.inner.write().await.remove(session_id).is_some())
    }
}
