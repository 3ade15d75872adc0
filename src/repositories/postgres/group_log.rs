// src/repositories/postgres/group_log.rs

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::Error;

#[async_trait::async_trait]
pub trait GroupLogRepo: Send + Sync {
    async fn record(
        &self,
        chat_id: i64,
        message_id: i64,
        thread_id: Option<i64>,
        user_id: i64,
        username: Option<&str>,
        first_name: Option<&str>,
        text: Option<&str>,
    ) -> Result<(), Error>;

    /// Retention sweep: drop rows received before the cutoff.
    /// Returns the number of rows removed.
    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, Error>;
}

pub struct PostgresGroupLogRepository {
    pub pool: Pool<Postgres>,
}

impl PostgresGroupLogRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl GroupLogRepo for PostgresGroupLogRepository {
    async fn record(
        &self,
        chat_id: i64,
        message_id: i64,
        thread_id: Option<i64>,
        user_id: i64,
        username: Option<&str>,
        first_name: Option<&str>,
        text: Option<&str>,
    ) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO group_messages (chat_id, message_id, thread_id, user_id, username, first_name, text)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(chat_id)
        .bind(message_id)
        .bind(thread_id)
        .bind(user_id)
        .bind(username)
        .bind(first_name)
        .bind(text)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, Error> {
        let result = sqlx::query("DELETE FROM group_messages WHERE received_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
