// src/services/contest_service.rs

use std::sync::Arc;

use tracing::info;

use crate::models::{
    Contest, ContestResult, ContestStatus, ContestType, NewContest, XpAward, XpReason,
};
use crate::repositories::ContestRepo;
use crate::services::XpService;
use crate::Error;

/// Owns the contest lifecycle and entry/vote admission. All admission
/// checks are gated on the current status; duplicate submissions are
/// rejected by the storage-level uniqueness constraints, so concurrent
/// double-submits resolve to exactly one winner.
pub struct ContestService {
    contests: Arc<dyn ContestRepo>,
    xp: Arc<XpService>,
}

impl ContestService {
    pub fn new(contests: Arc<dyn ContestRepo>, xp: Arc<XpService>) -> Self {
        Self { contests, xp }
    }

    pub async fn create(&self, contest: NewContest) -> Result<i64, Error> {
        let id = self.contests.create(&contest).await?;
        info!("contest #{} '{}' created ({})", id, contest.title, contest.contest_type);
        Ok(id)
    }

    pub async fn get(&self, id: i64) -> Result<Contest, Error> {
        self.contests
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("contest {}", id)))
    }

    /// Operator-driven transition. Statuses only move forward, and
    /// `voting` is reachable only for challenge contests.
    pub async fn advance(&self, id: i64, next: ContestStatus) -> Result<(), Error> {
        let contest = self.get(id).await?;

        if !contest.status.can_transition_to(next) {
            return Err(Error::InvalidState(format!(
                "contest {} cannot go {} -> {}",
                id, contest.status, next
            )));
        }
        if next == ContestStatus::Voting && contest.contest_type != ContestType::Challenge {
            return Err(Error::InvalidState(format!(
                "contest {} is a {}, only challenges have a voting phase",
                id, contest.contest_type
            )));
        }

        self.contests.set_status(id, next).await?;
        info!("contest #{} '{}' -> {}", id, contest.title, next);
        Ok(())
    }

    /// Entry admission for poll and challenge contests (quiz answers go
    /// through the live runner). Awards `xp_participate` on success.
    pub async fn submit_entry(
        &self,
        contest_id: i64,
        user_id: i64,
        answer: &str,
    ) -> Result<XpAward, Error> {
        let contest = self.get(contest_id).await?;

        if contest.status != ContestStatus::Active {
            return Err(Error::InvalidState(format!(
                "contest {} is not accepting entries (status: {})",
                contest_id, contest.status
            )));
        }

        let reason = match contest.contest_type {
            ContestType::Poll => XpReason::Poll,
            ContestType::Challenge => XpReason::ChallengeSubmit,
            ContestType::Quiz => {
                return Err(Error::InvalidState(format!(
                    "contest {} is a quiz; answers go through the live run",
                    contest_id
                )))
            }
        };

        // Unique (contest_id, user_id) insert is the admission gate.
        self.contests
            .insert_entry(contest_id, user_id, answer, None, 0)
            .await?;

        let reference = format!("contest:{}", contest_id);
        self.xp
            .award_xp(user_id, contest.xp_participate, reason, Some(&reference))
            .await
    }

    /// Vote admission, challenge contests in the `voting` phase only.
    /// Awards `xp_participate` to the voter on success.
    pub async fn vote(
        &self,
        contest_id: i64,
        voter_id: i64,
        entry_id: i64,
    ) -> Result<XpAward, Error> {
        let contest = self.get(contest_id).await?;

        if contest.status != ContestStatus::Voting {
            return Err(Error::InvalidState(format!(
                "contest {} is not in its voting phase (status: {})",
                contest_id, contest.status
            )));
        }

        self.contests
            .insert_vote(contest_id, voter_id, entry_id)
            .await?;

        let reference = format!("contest:{}", contest_id);
        self.xp
            .award_xp(
                voter_id,
                contest.xp_participate,
                XpReason::Vote,
                Some(&reference),
            )
            .await
    }

    /// Ranked results: challenges by peer votes, everything else by
    /// accumulated entry score.
    pub async fn results(&self, contest_id: i64) -> Result<Vec<ContestResult>, Error> {
        let contest = self.get(contest_id).await?;
        let entries = self.contests.entries_by_score(contest_id).await?;

        if contest.contest_type == ContestType::Challenge {
            let counts = self.contests.vote_counts(contest_id).await?;
            let mut results: Vec<ContestResult> = entries
                .into_iter()
                .map(|entry| {
                    let votes = counts
                        .iter()
                        .find(|(entry_id, _)| *entry_id == entry.id)
                        .map(|(_, v)| *v)
                        .unwrap_or(0);
                    ContestResult { entry, votes }
                })
                .collect();
            results.sort_by(|a, b| b.votes.cmp(&a.votes));
            return Ok(results);
        }

        Ok(entries
            .into_iter()
            .map(|entry| ContestResult { entry, votes: 0 })
            .collect())
    }
}
