use std::marker::{PhantomData, Unpin};

use async_trait::async_trait;
use sqlx::{sqlite::SqliteRow, Decode, Encode, Row, Sqlite, SqlitePool, Type};

use super::{RecordField, SessionRecordStore, UserSession};

/// A SQLite session record store via sqlx.
#[derive(Debug)]
pub struct SqliteRecordStore<Id> {
    pool: SqlitePool,
    table_name: String,
    _user_id_type: PhantomData<fn() -> Id>,
}

impl<Id> Clone for SqliteRecordStore<Id> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            table_name: self.table_name.clone(),
            _user_id_type: PhantomData,
        }
    }
}

impl<Id> SqliteRecordStore<Id> {
    /// Creates a new store with the provided pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            table_name: "user_sessions".to_string(),
            _user_id_type: PhantomData,
        }
    }

    /// Sets the table records are stored in. Defaults to `user_sessions`.
    ///
    /// # Panics
    ///
    /// The table name is written into query text, so this panics unless it
    /// is non-empty and made only of ASCII alphanumerics, hyphens, and
    /// underscores.
    pub fn with_table_name(mut self, table_name: impl AsRef<str>) -> Self {
        let table_name = table_name.as_ref();
        if !is_valid_table_name(table_name) {
            panic!(
                "Invalid table name '{}'. Table names must be alphanumeric and may contain \
                 hyphens or underscores.",
                table_name
            );
        }

        self.table_name = table_name.to_owned();
        self
    }

    /// Creates the records table if it doesn't already exist.
    pub async fn migrate(&self) -> sqlx::Result<()> {
        let query = format!(
            r#"
            create table if not exists "{}"
            (
                session_id text primary key not null,
                user_id not null,
                created_at text not null
            )
            "#,
            self.table_name
        );
        sqlx::query(&query).execute(&self.pool).await?;

        Ok(())
    }
}

fn is_valid_table_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn from_row<Id>(row: &SqliteRow) -> sqlx::Result<UserSession<Id>>
where
    Id: for<'r> Decode<'r, Sqlite> + Type<Sqlite>,
{
    Ok(UserSession {
        user_id: row.try_get("user_id")?,
        session_id: row.try_get("session_id")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl<Id> SessionRecordStore<Id> for SqliteRecordStore<Id>
where
    Id: for<'q> Encode<'q, Sqlite>
        + for<'r> Decode<'r, Sqlite>
        + Type<Sqlite>
        + Clone
        + Send
        + Sync
        + Unpin
        + 'static,
{
    type Error = sqlx::Error;

    async fn insert(&self, record: &UserSession<Id>) -> Result<(), Self::Error> {
        let query = format!(
            r#"
            insert into "{}" (session_id, user_id, created_at) values (?, ?, ?)
            on conflict(session_id) do update set
                user_id = excluded.user_id,
                created_at = excluded.created_at
            "#,
            self.table_name
        );
        sqlx::query(&query)
            .bind(record.session_id.clone())
            .bind(record.user_id.clone())
            .bind(record.created_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn find_matching(
        &self,
        field: RecordField,
        value: &str,
    ) -> Result<Vec<UserSession<Id>>, Self::Error> {
        let query = format!(
            r#"
            select user_id, session_id, created_at from "{}"
            where cast({} as text) = ?
            order by created_at
            "#,
            self.table_name,
            field.as_str()
        );
        let rows = sqlx::query(&query)
            .bind(value.to_owned())
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(from_row::<Id>).collect()
    }

    async fn remove(&self, record: &UserSession<Id>) -> Result<(), Self::Error> {
        let query = format!(
            r#"
            delete from "{}" where session_id = ?
            "#,
            self.table_name
        );
        sqlx::query(&query)
            .bind(record.session_id.clone())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
