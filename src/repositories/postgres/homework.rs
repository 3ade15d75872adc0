// src/repositories/postgres/homework.rs

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Row};

use crate::models::{Homework, HomeworkProgress, HomeworkStatus};
use crate::Error;

#[async_trait::async_trait]
pub trait HomeworkRepo: Send + Sync {
    async fn create(
        &self,
        title: &str,
        topic_slugs: &[&str],
        deadline: Option<DateTime<Utc>>,
        xp_reward: i64,
        created_by: Option<i64>,
    ) -> Result<i64, Error>;

    async fn get(&self, id: i64) -> Result<Option<Homework>, Error>;
    async fn active(&self) -> Result<Vec<Homework>, Error>;

    /// Active homework whose deadline has passed.
    async fn overdue(&self, now: DateTime<Utc>) -> Result<Vec<Homework>, Error>;

    /// Returns false when the homework was already closed.
    async fn close(&self, id: i64) -> Result<bool, Error>;

    /// Insert-or-conflict completion mark. A repeated completion of the
    /// same (homework, user, topic) surfaces as Error::Conflict so the
    /// caller never double-awards XP.
    async fn mark_complete(&self, homework_id: i64, user_id: i64, topic_slug: &str)
        -> Result<(), Error>;

    async fn user_progress(
        &self,
        homework_id: i64,
        user_id: i64,
    ) -> Result<Vec<HomeworkProgress>, Error>;

    async fn completed_user_count(&self, homework_id: i64) -> Result<i64, Error>;
}

pub struct PostgresHomeworkRepository {
    pub pool: Pool<Postgres>,
}

impl PostgresHomeworkRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

const HOMEWORK_COLUMNS: &str =
    "id, title, topic_slugs, deadline, xp_reward, status, created_by, created_at";

#[async_trait::async_trait]
impl HomeworkRepo for PostgresHomeworkRepository {
    async fn create(
        &self,
        title: &str,
        topic_slugs: &[&str],
        deadline: Option<DateTime<Utc>>,
        xp_reward: i64,
        created_by: Option<i64>,
    ) -> Result<i64, Error> {
        let slugs = topic_slugs.join(",");
        let row = sqlx::query(
            r#"
            INSERT INTO homework (title, topic_slugs, deadline, xp_reward, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(title)
        .bind(slugs)
        .bind(deadline)
        .bind(xp_reward)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.try_get("id")?)
    }

    async fn get(&self, id: i64) -> Result<Option<Homework>, Error> {
        let row = sqlx::query_as::<_, Homework>(&format!(
            "SELECT {HOMEWORK_COLUMNS} FROM homework WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn active(&self) -> Result<Vec<Homework>, Error> {
        let rows = sqlx::query_as::<_, Homework>(&format!(
            "SELECT {HOMEWORK_COLUMNS} FROM homework WHERE status = 'active' ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn overdue(&self, now: DateTime<Utc>) -> Result<Vec<Homework>, Error> {
        let rows = sqlx::query_as::<_, Homework>(&format!(
            r#"
            SELECT {HOMEWORK_COLUMNS}
            FROM homework
            WHERE status = 'active' AND deadline IS NOT NULL AND deadline < $1
            "#
        ))
        .bind(now)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn close(&self, id: i64) -> Result<bool, Error> {
        let result = sqlx::query("UPDATE homework SET status = $1 WHERE id = $2 AND status = 'active'")
            .bind(HomeworkStatus::Closed)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_complete(
        &self,
        homework_id: i64,
        user_id: i64,
        topic_slug: &str,
    ) -> Result<(), Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO homework_progress (homework_id, user_id, topic_slug)
            VALUES ($1, $2, $3)
            ON CONFLICT (homework_id, user_id, topic_slug) DO NOTHING
            "#,
        )
        .bind(homework_id)
        .bind(user_id)
        .bind(topic_slug)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::Conflict(format!(
                "topic '{}' of homework {} already completed by user {}",
                topic_slug, homework_id, user_id
            )));
        }
        Ok(())
    }

    async fn user_progress(
        &self,
        homework_id: i64,
        user_id: i64,
    ) -> Result<Vec<HomeworkProgress>, Error> {
        let rows = sqlx::query_as::<_, HomeworkProgress>(
            r#"
            SELECT id, homework_id, user_id, topic_slug, completed_at
            FROM homework_progress
            WHERE homework_id = $1 AND user_id = $2
            "#,
        )
        .bind(homework_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn completed_user_count(&self, homework_id: i64) -> Result<i64, Error> {
        let row = sqlx::query(
            "SELECT COUNT(DISTINCT user_id) AS cnt FROM homework_progress WHERE homework_id = $1",
        )
        .bind(homework_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.try_get("cnt")?)
    }
}
