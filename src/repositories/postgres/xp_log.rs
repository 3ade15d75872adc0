// src/repositories/postgres/xp_log.rs

use chrono::{Duration, Utc};
use sqlx::{Pool, Postgres, Row};

use crate::models::leveling::level_for;
use crate::models::{XpAward, XpReason};
use crate::Error;

#[async_trait::async_trait]
pub trait XpRepo: Send + Sync {
    /// Append a ledger row, bump the user's cumulative total and re-derive
    /// the level, all in one transaction. Either everything lands or
    /// nothing does.
    async fn award(
        &self,
        user_id: i64,
        amount: i64,
        reason: XpReason,
        reference_id: Option<&str>,
    ) -> Result<XpAward, Error>;

    /// Number of ledger rows with this reason in the trailing 24h.
    /// Used by callers to enforce daily caps before awarding.
    async fn daily_count(&self, user_id: i64, reason: XpReason) -> Result<i64, Error>;

    /// Per-reason XP totals for a user, largest first.
    async fn breakdown(&self, user_id: i64) -> Result<Vec<(XpReason, i64)>, Error>;
}

pub struct PostgresXpRepository {
    pub pool: Pool<Postgres>,
}

impl PostgresXpRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl XpRepo for PostgresXpRepository {
    async fn award(
        &self,
        user_id: i64,
        amount: i64,
        reason: XpReason,
        reference_id: Option<&str>,
    ) -> Result<XpAward, Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO xp_log (user_id, amount, reason, reference_id)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(user_id)
        .bind(amount)
        .bind(reason)
        .bind(reference_id)
        .execute(&mut *tx)
        .await?;

        // Single-statement increment: concurrent awards to the same user
        // serialize on the row lock, so no update is lost.
        let row = sqlx::query(
            r#"
            UPDATE users
            SET xp = xp + $1, updated_at = now()
            WHERE telegram_id = $2
            RETURNING xp, xp_level
            "#,
        )
        .bind(amount)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let row = match row {
            Some(r) => r,
            None => return Err(Error::NotFound(format!("user {}", user_id))),
        };

        let new_total: i64 = row.try_get("xp")?;
        let stored_level: i32 = row.try_get("xp_level")?;
        let new_level = level_for(new_total);
        let leveled_up = new_level != stored_level;

        if leveled_up {
            sqlx::query("UPDATE users SET xp_level = $1, updated_at = now() WHERE telegram_id = $2")
                .bind(new_level)
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(XpAward {
            new_total,
            new_level,
            leveled_up,
        })
    }

    async fn daily_count(&self, user_id: i64, reason: XpReason) -> Result<i64, Error> {
        let cutoff = Utc::now() - Duration::hours(24);
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS cnt
            FROM xp_log
            WHERE user_id = $1 AND reason = $2 AND created_at >= $3
            "#,
        )
        .bind(user_id)
        .bind(reason)
        .bind(cutoff)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.try_get("cnt")?)
    }

    async fn breakdown(&self, user_id: i64) -> Result<Vec<(XpReason, i64)>, Error> {
        let rows = sqlx::query(
            r#"
            SELECT reason, SUM(amount) AS total
            FROM xp_log
            WHERE user_id = $1
            GROUP BY reason
            ORDER BY total DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for r in rows {
            let reason: XpReason = r.try_get("reason")?;
            let total: i64 = r.try_get("total")?;
            out.push((reason, total));
        }
        Ok(out)
    }
}
