// src/repositories/postgres/subscriptions.rs

use sqlx::{Pool, Postgres, Row};

use crate::Error;

#[async_trait::async_trait]
pub trait SubscriptionRepo: Send + Sync {
    /// Recipient ids subscribed to a topic, fresh at call time.
    async fn subscriber_ids(&self, topic_slug: &str) -> Result<Vec<i64>, Error>;
}

pub struct PostgresSubscriptionRepository {
    pub pool: Pool<Postgres>,
}

impl PostgresSubscriptionRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl SubscriptionRepo for PostgresSubscriptionRepository {
    async fn subscriber_ids(&self, topic_slug: &str) -> Result<Vec<i64>, Error> {
        let rows = sqlx::query(
            "SELECT user_id FROM subscriptions WHERE topic_slug = $1 ORDER BY subscribed_at ASC",
        )
        .bind(topic_slug)
        .fetch_all(&self.pool)
        .await?;

        let mut ids = Vec::with_capacity(rows.len());
        for r in rows {
            ids.push(r.try_get("user_id")?);
        }
        Ok(ids)
    }
}
