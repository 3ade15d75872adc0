// src/repositories/postgres/contests.rs

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Row};

use crate::models::{Contest, ContestEntry, ContestStatus, NewContest};
use crate::Error;

#[async_trait::async_trait]
pub trait ContestRepo: Send + Sync {
    async fn create(&self, contest: &NewContest) -> Result<i64, Error>;
    async fn get(&self, id: i64) -> Result<Option<Contest>, Error>;
    async fn set_status(&self, id: i64, status: ContestStatus) -> Result<(), Error>;

    /// Contests still open (pending/active/voting), newest first.
    async fn open_contests(&self) -> Result<Vec<Contest>, Error>;

    /// Open contests whose deadline has passed.
    async fn open_past_deadline(&self, now: DateTime<Utc>) -> Result<Vec<Contest>, Error>;

    /// Insert-or-conflict admission for poll/challenge entries. The unique
    /// (contest_id, user_id) index is the concurrency control: a duplicate
    /// surfaces as Error::Conflict.
    async fn insert_entry(
        &self,
        contest_id: i64,
        user_id: i64,
        answer: &str,
        is_correct: Option<bool>,
        score: i64,
    ) -> Result<(), Error>;

    /// Quiz variant: repeat submissions accumulate score across questions
    /// instead of overwriting. Per-question double-scoring is gated by the
    /// live runner, not here.
    async fn upsert_quiz_entry(
        &self,
        contest_id: i64,
        user_id: i64,
        answer: &str,
        is_correct: bool,
        score_delta: i64,
    ) -> Result<(), Error>;

    async fn user_entry(&self, contest_id: i64, user_id: i64)
        -> Result<Option<ContestEntry>, Error>;

    async fn entries_by_score(&self, contest_id: i64) -> Result<Vec<ContestEntry>, Error>;

    /// Insert-or-conflict vote admission, same uniqueness pattern as entries.
    async fn insert_vote(&self, contest_id: i64, voter_id: i64, entry_id: i64)
        -> Result<(), Error>;

    /// (entry_id, votes), most voted first.
    async fn vote_counts(&self, contest_id: i64) -> Result<Vec<(i64, i64)>, Error>;
}

pub struct PostgresContestRepository {
    pub pool: Pool<Postgres>,
}

impl PostgresContestRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

const CONTEST_COLUMNS: &str = "id, contest_type, title, description, status, config, deadline, \
                               xp_first, xp_second, xp_third, xp_participate, created_by, created_at";

const ENTRY_COLUMNS: &str = "id, contest_id, user_id, answer, is_correct, score, submitted_at";

#[async_trait::async_trait]
impl ContestRepo for PostgresContestRepository {
    async fn create(&self, contest: &NewContest) -> Result<i64, Error> {
        let row = sqlx::query(
            r#"
            INSERT INTO contests (contest_type, title, description, config, deadline,
                                  xp_first, xp_second, xp_third, xp_participate, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            "#,
        )
        .bind(contest.contest_type)
        .bind(&contest.title)
        .bind(&contest.description)
        .bind(&contest.config)
        .bind(contest.deadline)
        .bind(contest.xp_first)
        .bind(contest.xp_second)
        .bind(contest.xp_third)
        .bind(contest.xp_participate)
        .bind(contest.created_by)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.try_get("id")?)
    }

    async fn get(&self, id: i64) -> Result<Option<Contest>, Error> {
        let row = sqlx::query_as::<_, Contest>(&format!(
            "SELECT {CONTEST_COLUMNS} FROM contests WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn set_status(&self, id: i64, status: ContestStatus) -> Result<(), Error> {
        sqlx::query("UPDATE contests SET status = $1 WHERE id = $2")
            .bind(status)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn open_contests(&self) -> Result<Vec<Contest>, Error> {
        let rows = sqlx::query_as::<_, Contest>(&format!(
            r#"
            SELECT {CONTEST_COLUMNS}
            FROM contests
            WHERE status IN ('pending', 'active', 'voting')
            ORDER BY created_at DESC
            "#
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn open_past_deadline(&self, now: DateTime<Utc>) -> Result<Vec<Contest>, Error> {
        let rows = sqlx::query_as::<_, Contest>(&format!(
            r#"
            SELECT {CONTEST_COLUMNS}
            FROM contests
            WHERE status IN ('pending', 'active', 'voting')
              AND deadline IS NOT NULL AND deadline <= $1
            ORDER BY deadline ASC
            "#
        ))
        .bind(now)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn insert_entry(
        &self,
        contest_id: i64,
        user_id: i64,
        answer: &str,
        is_correct: Option<bool>,
        score: i64,
    ) -> Result<(), Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO contest_entries (contest_id, user_id, answer, is_correct, score)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (contest_id, user_id) DO NOTHING
            "#,
        )
        .bind(contest_id)
        .bind(user_id)
        .bind(answer)
        .bind(is_correct)
        .bind(score)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::Conflict(format!(
                "user {} already entered contest {}",
                user_id, contest_id
            )));
        }
        Ok(())
    }

    async fn upsert_quiz_entry(
        &self,
        contest_id: i64,
        user_id: i64,
        answer: &str,
        is_correct: bool,
        score_delta: i64,
    ) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO contest_entries (contest_id, user_id, answer, is_correct, score)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (contest_id, user_id) DO UPDATE
            SET answer = EXCLUDED.answer,
                is_correct = EXCLUDED.is_correct,
                score = contest_entries.score + EXCLUDED.score
            "#,
        )
        .bind(contest_id)
        .bind(user_id)
        .bind(answer)
        .bind(is_correct)
        .bind(score_delta)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn user_entry(
        &self,
        contest_id: i64,
        user_id: i64,
    ) -> Result<Option<ContestEntry>, Error> {
        let row = sqlx::query_as::<_, ContestEntry>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM contest_entries WHERE contest_id = $1 AND user_id = $2"
        ))
        .bind(contest_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn entries_by_score(&self, contest_id: i64) -> Result<Vec<ContestEntry>, Error> {
        let rows = sqlx::query_as::<_, ContestEntry>(&format!(
            r#"
            SELECT {ENTRY_COLUMNS}
            FROM contest_entries
            WHERE contest_id = $1
            ORDER BY score DESC, submitted_at ASC
            "#
        ))
        .bind(contest_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn insert_vote(
        &self,
        contest_id: i64,
        voter_id: i64,
        entry_id: i64,
    ) -> Result<(), Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO contest_votes (contest_id, voter_id, entry_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (contest_id, voter_id) DO NOTHING
            "#,
        )
        .bind(contest_id)
        .bind(voter_id)
        .bind(entry_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::Conflict(format!(
                "user {} already voted in contest {}",
                voter_id, contest_id
            )));
        }
        Ok(())
    }

    async fn vote_counts(&self, contest_id: i64) -> Result<Vec<(i64, i64)>, Error> {
        let rows = sqlx::query(
            r#"
            SELECT entry_id, COUNT(*) AS votes
            FROM contest_votes
            WHERE contest_id = $1
            GROUP BY entry_id
            ORDER BY votes DESC
            "#,
        )
        .bind(contest_id)
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for r in rows {
            out.push((r.try_get("entry_id")?, r.try_get("votes")?));
        }
        Ok(out)
    }
}
