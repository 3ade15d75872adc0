// src/tasks/scheduler.rs
//
// The temporal heart of the bot: a fixed-period tick that discovers due
// work (pending broadcasts, overdue homework, expired contest deadlines)
// and drives each transition exactly once. Ticks never overlap — the loop
// awaits a full scan before sleeping again — while broadcast dispatches
// run as detached tasks so one large fan-out cannot starve other due work.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use crate::models::{ContestStatus, ContestType};
use crate::repositories::{ContestRepo, GroupLogRepo, HomeworkRepo, ScheduledMessageRepo};
use crate::services::{AudienceResolver, Dispatcher, QuizRunner};
use crate::Error;

pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(60);

/// Group-chat log rows older than this are swept every tick.
const GROUP_LOG_RETENTION_DAYS: i64 = 7;

pub struct Scheduler {
    pub messages: Arc<dyn ScheduledMessageRepo>,
    pub homework: Arc<dyn HomeworkRepo>,
    pub contests: Arc<dyn ContestRepo>,
    pub group_log: Arc<dyn GroupLogRepo>,
    pub audience: Arc<AudienceResolver>,
    pub dispatcher: Arc<Dispatcher>,
    pub quiz_runner: Arc<QuizRunner>,
}

impl Scheduler {
    /// Spawns the tick loop. `MissedTickBehavior::Delay` keeps ticks from
    /// stacking up behind a slow scan.
    pub fn spawn(self: Arc<Self>, period: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!("Scheduler started (tick every {:?})", period);
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                self.tick().await;
            }
        })
    }

    /// One scan over all due work. A failing section logs and never stops
    /// the remaining sections; a failing item never stops its siblings.
    pub async fn tick(self: &Arc<Self>) {
        if let Err(e) = self.process_due_messages().await {
            error!("scheduled message scan failed: {:?}", e);
        }
        if let Err(e) = self.close_overdue_homework().await {
            error!("homework deadline scan failed: {:?}", e);
        }
        if let Err(e) = self.expire_contests().await {
            error!("contest deadline scan failed: {:?}", e);
        }
        if let Err(e) = self.sweep_group_log().await {
            error!("group log sweep failed: {:?}", e);
        }
    }

    /// Pick up due pending broadcasts. The pending -> sending flip is the
    /// sole admission gate: whichever scan wins the flip owns the dispatch,
    /// so overlapping scans (or a concurrent operator action) can never
    /// double-send. Each claimed message dispatches in a detached task.
    async fn process_due_messages(self: &Arc<Self>) -> Result<(), Error> {
        let due = self.messages.due_pending(Utc::now()).await?;

        for msg in due {
            if !self.messages.claim_for_sending(msg.id).await? {
                continue;
            }

            let scheduler = Arc::clone(self);
            tokio::spawn(async move {
                let selector = msg.audience_selector();
                let recipients = match scheduler.audience.resolve(&selector).await {
                    Ok(ids) => ids,
                    Err(e) => {
                        error!("audience resolution for message #{} failed: {:?}", msg.id, e);
                        return;
                    }
                };

                let report = scheduler.dispatcher.dispatch(&recipients, &msg.text).await;
                info!(
                    "scheduled message #{} sent: {} ok, {} failed, {} blocked ({} total)",
                    msg.id, report.sent, report.failed, report.blocked, report.total
                );

                if let Err(e) = scheduler.messages.mark_sent(msg.id, report.sent as i64).await {
                    error!("failed to mark message #{} sent: {:?}", msg.id, e);
                }
            });
        }
        Ok(())
    }

    /// Homework past its deadline closes quietly; no notification goes out.
    async fn close_overdue_homework(&self) -> Result<(), Error> {
        let overdue = self.homework.overdue(Utc::now()).await?;
        for hw in overdue {
            match self.homework.close(hw.id).await {
                Ok(true) => info!("homework #{} '{}' auto-closed (deadline passed)", hw.id, hw.title),
                Ok(false) => {}
                Err(e) => error!("failed to close homework #{}: {:?}", hw.id, e),
            }
        }
        Ok(())
    }

    /// Contests past their deadline: an active challenge opens its voting
    /// phase (ranking needs peer votes); everything else closes. Closing a
    /// quiz also cancels its live sequencer, if one is running.
    async fn expire_contests(&self) -> Result<(), Error> {
        let due = self.contests.open_past_deadline(Utc::now()).await?;

        for contest in due {
            let next = if contest.contest_type == ContestType::Challenge
                && contest.status == ContestStatus::Active
            {
                ContestStatus::Voting
            } else {
                ContestStatus::Closed
            };

            if let Err(e) = self.contests.set_status(contest.id, next).await {
                error!("failed to transition contest #{}: {:?}", contest.id, e);
                continue;
            }
            if next == ContestStatus::Closed {
                self.quiz_runner.cancel(contest.id);
            }
            info!("contest #{} '{}' -> {} (deadline passed)", contest.id, contest.title, next);
        }
        Ok(())
    }

    async fn sweep_group_log(&self) -> Result<(), Error> {
        let cutoff = Utc::now() - chrono::Duration::days(GROUP_LOG_RETENTION_DAYS);
        let removed = self.group_log.delete_older_than(cutoff).await?;
        if removed > 0 {
            info!("swept {} group log rows older than {} days", removed, GROUP_LOG_RETENTION_DAYS);
        }
        Ok(())
    }
}
