// src/services/homework_service.rs

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::models::{Homework, HomeworkStatus, XpAward, XpReason};
use crate::repositories::HomeworkRepo;
use crate::services::XpService;
use crate::Error;

pub struct HomeworkService {
    homework: Arc<dyn HomeworkRepo>,
    xp: Arc<XpService>,
}

impl HomeworkService {
    pub fn new(homework: Arc<dyn HomeworkRepo>, xp: Arc<XpService>) -> Self {
        Self { homework, xp }
    }

    pub async fn assign(
        &self,
        title: &str,
        topic_slugs: &[&str],
        deadline: Option<DateTime<Utc>>,
        xp_reward: i64,
        created_by: Option<i64>,
    ) -> Result<i64, Error> {
        let id = self
            .homework
            .create(title, topic_slugs, deadline, xp_reward, created_by)
            .await?;
        info!("homework #{} '{}' assigned ({} topics)", id, title, topic_slugs.len());
        Ok(id)
    }

    pub async fn get(&self, id: i64) -> Result<Homework, Error> {
        self.homework
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("homework {}", id)))
    }

    /// Operator close; the scheduler uses the repo directly on deadline.
    pub async fn close(&self, id: i64) -> Result<bool, Error> {
        let closed = self.homework.close(id).await?;
        if closed {
            info!("homework #{} closed", id);
        }
        Ok(closed)
    }

    /// Marks one topic of a homework complete for a user and awards its
    /// XP reward. Closed homework rejects further completions; repeats
    /// are rejected by the unique progress row, so the reward is paid at
    /// most once per (homework, user, topic).
    pub async fn complete_topic(
        &self,
        homework_id: i64,
        user_id: i64,
        topic_slug: &str,
    ) -> Result<XpAward, Error> {
        let hw = self.get(homework_id).await?;

        if hw.status != HomeworkStatus::Active {
            return Err(Error::InvalidState(format!(
                "homework {} is closed",
                homework_id
            )));
        }
        if !hw.topics().contains(&topic_slug) {
            return Err(Error::NotFound(format!(
                "topic '{}' is not part of homework {}",
                topic_slug, homework_id
            )));
        }

        self.homework
            .mark_complete(homework_id, user_id, topic_slug)
            .await?;

        let reference = format!("hw:{}:{}", homework_id, topic_slug);
        self.xp
            .award_xp(user_id, hw.xp_reward, XpReason::Homework, Some(&reference))
            .await
    }
}
