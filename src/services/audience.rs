// src/services/audience.rs

use std::sync::Arc;

use crate::models::Audience;
use crate::repositories::{SubscriptionRepo, UserRepo};
use crate::Error;

/// Resolves an audience selector to the recipient id set. Always queries
/// fresh; a broadcast never reuses a stale snapshot. An empty result is a
/// valid outcome, not an error.
pub struct AudienceResolver {
    users: Arc<dyn UserRepo>,
    subscriptions: Arc<dyn SubscriptionRepo>,
}

impl AudienceResolver {
    pub fn new(users: Arc<dyn UserRepo>, subscriptions: Arc<dyn SubscriptionRepo>) -> Self {
        Self {
            users,
            subscriptions,
        }
    }

    pub async fn resolve(&self, audience: &Audience) -> Result<Vec<i64>, Error> {
        match audience {
            Audience::All => self.users.all_user_ids().await,
            Audience::Completed => self.users.completed_user_ids().await,
            Audience::Topic(slug) => self.subscriptions.subscriber_ids(slug).await,
        }
    }
}
