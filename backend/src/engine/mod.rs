//! Connection/match engine: candidate filtering, the request lifecycle and
//! mutual-match detection. Every operation takes the acting member's identity
//! explicitly; nothing is read from ambient session state.

pub mod candidates;
pub mod lifecycle;
pub mod mutual;
pub mod profiles;
pub mod views;

#[cfg(test)]
pub(crate) mod test_support;

use std::sync::Arc;

use tokio::sync::broadcast;
use uuid::Uuid;

use crate::constants::MATCH_EVENT_CHANNEL_CAPACITY;
use crate::db::MatchStore;
use crate::error::{MatchError, MatchResult};
use crate::models::{MatchEvent, Profile};
use crate::utils::ProfileRules;

pub use candidates::{filter_candidates, is_compatible};
pub use mutual::is_mutual;

#[derive(Clone)]
pub struct MatchEngine {
    store: Arc<dyn MatchStore>,
    rules: ProfileRules,
    events: broadcast::Sender<MatchEvent>,
}

impl MatchEngine {
    pub fn new(store: Arc<dyn MatchStore>, rules: ProfileRules) -> Self {
        let (events, _) = broadcast::channel(MATCH_EVENT_CHANNEL_CAPACITY);
        Self { store, rules, events }
    }

    /// Receives every match event published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<MatchEvent> {
        self.events.subscribe()
    }

    pub fn rules(&self) -> ProfileRules {
        self.rules
    }

    async fn require_profile(&self, user_id: Uuid) -> MatchResult<Profile> {
        self.store
            .profile_by_user(user_id)
            .await?
            .ok_or(MatchError::NotFound("Profile"))
    }
}
