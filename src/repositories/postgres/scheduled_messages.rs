// src/repositories/postgres/scheduled_messages.rs

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Row};

use crate::models::{Audience, MessageStatus, ScheduledMessage};
use crate::Error;

#[async_trait::async_trait]
pub trait ScheduledMessageRepo: Send + Sync {
    async fn create(
        &self,
        text: &str,
        audience: &Audience,
        send_at: DateTime<Utc>,
        created_by: Option<i64>,
    ) -> Result<i64, Error>;

    async fn get(&self, id: i64) -> Result<Option<ScheduledMessage>, Error>;

    /// Pending messages whose send_at has passed, oldest first.
    async fn due_pending(&self, now: DateTime<Utc>) -> Result<Vec<ScheduledMessage>, Error>;

    /// Atomic admission gate: flips pending -> sending and reports whether
    /// this caller won. A message already in `sending` or beyond is never
    /// claimed twice.
    async fn claim_for_sending(&self, id: i64) -> Result<bool, Error>;

    async fn mark_sent(&self, id: i64, sent_count: i64) -> Result<(), Error>;

    /// Operator cancel. Only effective while the message is still pending.
    async fn cancel(&self, id: i64) -> Result<bool, Error>;

    async fn upcoming(&self, limit: i64) -> Result<Vec<ScheduledMessage>, Error>;
}

pub struct PostgresScheduledMessageRepository {
    pub pool: Pool<Postgres>,
}

impl PostgresScheduledMessageRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

const MESSAGE_COLUMNS: &str =
    "id, text, audience, topic_slug, send_at, status, sent_count, created_by, created_at";

#[async_trait::async_trait]
impl ScheduledMessageRepo for PostgresScheduledMessageRepository {
    async fn create(
        &self,
        text: &str,
        audience: &Audience,
        send_at: DateTime<Utc>,
        created_by: Option<i64>,
    ) -> Result<i64, Error> {
        let (audience_col, topic_slug) = audience.as_columns();
        let row = sqlx::query(
            r#"
            INSERT INTO scheduled_messages (text, audience, topic_slug, send_at, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(text)
        .bind(audience_col)
        .bind(topic_slug)
        .bind(send_at)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.try_get("id")?)
    }

    async fn get(&self, id: i64) -> Result<Option<ScheduledMessage>, Error> {
        let row = sqlx::query_as::<_, ScheduledMessage>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM scheduled_messages WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn due_pending(&self, now: DateTime<Utc>) -> Result<Vec<ScheduledMessage>, Error> {
        let rows = sqlx::query_as::<_, ScheduledMessage>(&format!(
            r#"
            SELECT {MESSAGE_COLUMNS}
            FROM scheduled_messages
            WHERE status = 'pending' AND send_at <= $1
            ORDER BY send_at ASC
            "#
        ))
        .bind(now)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn claim_for_sending(&self, id: i64) -> Result<bool, Error> {
        let result = sqlx::query(
            "UPDATE scheduled_messages SET status = 'sending' WHERE id = $1 AND status = 'pending'",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_sent(&self, id: i64, sent_count: i64) -> Result<(), Error> {
        sqlx::query("UPDATE scheduled_messages SET status = $1, sent_count = $2 WHERE id = $3")
            .bind(MessageStatus::Sent)
            .bind(sent_count)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn cancel(&self, id: i64) -> Result<bool, Error> {
        let result = sqlx::query(
            "UPDATE scheduled_messages SET status = 'cancelled' WHERE id = $1 AND status = 'pending'",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn upcoming(&self, limit: i64) -> Result<Vec<ScheduledMessage>, Error> {
        let rows = sqlx::query_as::<_, ScheduledMessage>(&format!(
            r#"
            SELECT {MESSAGE_COLUMNS}
            FROM scheduled_messages
            WHERE status = 'pending'
            ORDER BY send_at ASC
            LIMIT $1
            "#
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
