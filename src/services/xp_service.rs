// src/services/xp_service.rs

use std::sync::Arc;

use tracing::info;

use crate::models::leveling::level_title;
use crate::models::{XpAward, XpReason};
use crate::repositories::XpRepo;
use crate::Error;

/// Monotonic point accrual. The engine is unconditional once invoked:
/// daily caps are a precondition the caller checks via `within_daily_cap`.
pub struct XpService {
    xp_repo: Arc<dyn XpRepo>,
}

impl XpService {
    pub fn new(xp_repo: Arc<dyn XpRepo>) -> Self {
        Self { xp_repo }
    }

    pub async fn award_xp(
        &self,
        user_id: i64,
        amount: i64,
        reason: XpReason,
        reference_id: Option<&str>,
    ) -> Result<XpAward, Error> {
        let award = self.xp_repo.award(user_id, amount, reason, reference_id).await?;

        if award.leveled_up {
            info!(
                "user {} leveled up to {} ({}) at {} XP",
                user_id,
                award.new_level,
                level_title(award.new_level),
                award.new_total
            );
        }
        Ok(award)
    }

    /// True while the user is under `cap` awards of this reason in the
    /// trailing 24h window.
    pub async fn within_daily_cap(
        &self,
        user_id: i64,
        reason: XpReason,
        cap: i64,
    ) -> Result<bool, Error> {
        let count = self.xp_repo.daily_count(user_id, reason).await?;
        Ok(count < cap)
    }

    pub async fn breakdown(&self, user_id: i64) -> Result<Vec<(XpReason, i64)>, Error> {
        self.xp_repo.breakdown(user_id).await
    }
}
