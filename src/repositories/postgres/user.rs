// src/repositories/postgres/user.rs

use crate::models::{LeaderboardRow, User};
use crate::Error;
use sqlx::{Pool, Postgres, Row};

#[async_trait::async_trait]
pub trait UserRepo: Send + Sync {
    async fn get(&self, telegram_id: i64) -> Result<Option<User>, Error>;
    /// Every known recipient id. Fresh snapshot on every call.
    async fn all_user_ids(&self) -> Result<Vec<i64>, Error>;
    /// Only users who finished onboarding.
    async fn completed_user_ids(&self) -> Result<Vec<i64>, Error>;
    async fn leaderboard(&self, limit: i64) -> Result<Vec<LeaderboardRow>, Error>;
    /// 1-based rank: how many users have more XP, plus one.
    async fn rank(&self, telegram_id: i64) -> Result<i64, Error>;
}

pub struct UserRepository {
    pub pool: Pool<Postgres>,
}

impl UserRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl UserRepo for UserRepository {
    async fn get(&self, telegram_id: i64) -> Result<Option<User>, Error> {
        let row = sqlx::query_as::<_, User>(
            r#"
            SELECT telegram_id, username, first_name, display_name, lang,
                   onboarding_complete, xp, xp_level, joined_at, updated_at
            FROM users
            WHERE telegram_id = $1
            "#,
        )
        .bind(telegram_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn all_user_ids(&self) -> Result<Vec<i64>, Error> {
        let rows = sqlx::query("SELECT telegram_id FROM users ORDER BY joined_at ASC")
            .fetch_all(&self.pool)
            .await?;
        let mut ids = Vec::with_capacity(rows.len());
        for r in rows {
            ids.push(r.try_get("telegram_id")?);
        }
        Ok(ids)
    }

    async fn completed_user_ids(&self) -> Result<Vec<i64>, Error> {
        let rows = sqlx::query(
            "SELECT telegram_id FROM users WHERE onboarding_complete ORDER BY joined_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        let mut ids = Vec::with_capacity(rows.len());
        for r in rows {
            ids.push(r.try_get("telegram_id")?);
        }
        Ok(ids)
    }

    async fn leaderboard(&self, limit: i64) -> Result<Vec<LeaderboardRow>, Error> {
        let rows = sqlx::query_as::<_, LeaderboardRow>(
            r#"
            SELECT telegram_id, display_name, first_name, username, xp, xp_level
            FROM users
            ORDER BY xp DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn rank(&self, telegram_id: i64) -> Result<i64, Error> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) + 1 AS rank
            FROM users
            WHERE xp > (SELECT xp FROM users WHERE telegram_id = $1)
            "#,
        )
        .bind(telegram_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.try_get("rank")?)
    }
}
