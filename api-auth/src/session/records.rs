use std::{
    convert::Infallible,
    fmt::Display,
    sync::Arc,
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::sync::RwLock;

/// A session persisted outside process memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession<Id> {
    /// The user the session belongs to.
    pub user_id: Id,

    /// The opaque session ID handed to the client.
    pub session_id: String,

    /// When the session was created.
    pub created_at: OffsetDateTime,
}

/// A searchable field of a [`UserSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordField {
    /// The `session_id` field.
    SessionId,

    /// The `user_id` field.
    UserId,
}

impl RecordField {
    /// The field's column name.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordField::SessionId => "session_id",
            RecordField::UserId => "user_id",
        }
    }
}

/// Durable storage for [`UserSession`] records.
#[async_trait]
pub trait SessionRecordStore<Id>: Clone + Send + Sync + 'static
where
    Id: Send + Sync + 'static,
{
    /// An error which can occur in the backing storage.
    type Error: std::error::Error + Send + Sync;

    /// Persists a record.
    async fn insert(&self, record: &UserSession<Id>) -> Result<(), Self::Error>;

    /// Returns every record whose `field` equals `value`, oldest first.
    async fn find_matching(
        &self,
        field: RecordField,
        value: &str,
    ) -> Result<Vec<UserSession<Id>>, Self::Error>;

    /// Removes a record.
    async fn remove(&self, record: &UserSession<Id>) -> Result<(), Self::Error>;
}

/// An ephemeral record store, useful for testing and demonstration
/// purposes.
#[derive(Debug)]
pub struct MemoryRecordStore<Id> {
    inner: Arc<RwLock<Vec<UserSession<Id>>>>,
}

impl<Id> Clone for MemoryRecordStore<Id> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<Id> Default for MemoryRecordStore<Id> {
    fn default() -> Self {
        Self {
            inner: Arc::default(),
        }
    }
}

impl<Id> MemoryRecordStore<Id> {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of stored records.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Returns `true` when no records are stored.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[async_trait]
impl<Id> SessionRecordStore<Id> for MemoryRecordStore<Id>
where
    Id: Display + Clone + PartialEq + Send + Sync + 'static,
{
    type Error = Infallible;

    async fn insert(&self, record: &UserSession<Id>) -> Result<(), Self::Error> {
        self.inner.write().await.push(record.clone());
        Ok(())
    }

    async fn find_matching(
        &self,
        field: RecordField,
        value: &str,
    ) -> Result<Vec<UserSession<Id>>, Self::Error> {
        Ok(self
            .inner
            .read()
            .await
            .iter()
            .filter(|record| match field {
                RecordField::SessionId => record.session_id == value,
                RecordField::UserId => record.user_id.to_string() == value,
            })
            .cloned()
            .collect())
    }

    async fn remove(&self, record: &UserSession<Id>) -> Result<(), Self::Error> {
        let mut records = self.inner.write().await;
        if let Some(pos) = records.iter().position(|r| r == record) {
            records.remove(pos);
        }
        Ok(())
    }
}
