use std::collections::HashMap;

use uuid::Uuid;

use super::{MatchEngine, is_mutual};
use crate::error::MatchResult;
use crate::models::{ConnectionStatus, ContactCard, Inbox, Profile, RequestView};

impl MatchEngine {
    /// Pending requests addressed to and sent by the viewer, newest first.
    pub async fn inbox(&self, viewer_id: Uuid) -> MatchResult<Inbox> {
        let rows = self.store.connections_for(viewer_id).await?;
        // Requests left over from a pair that matched meanwhile are not shown.
        let pending: Vec<_> = rows
            .iter()
            .filter(|c| c.status == ConnectionStatus::Pending)
            .filter(|c| !is_mutual(c.requester_id, c.target_id, &rows))
            .collect();

        let counterpart_ids: Vec<Uuid> = pending.iter().map(|c| c.counterpart(viewer_id)).collect();
        let profiles = self.profiles_by_id(&counterpart_ids).await?;

        let mut inbox = Inbox::default();
        for request in pending.iter().rev() {
            let Some(profile) = profiles.get(&request.counterpart(viewer_id)) else {
                continue;
            };
            let view = RequestView {
                connection_id: request.id,
                profile: profile.public(),
                requested_at: request.created_at,
            };
            if request.target_id == viewer_id {
                inbox.received.push(view);
            } else {
                inbox.sent.push(view);
            }
        }

        Ok(inbox)
    }

    /// Contact cards of everyone the viewer is matched with. This is the only
    /// read that hands out phone numbers.
    pub async fn matches(&self, viewer_id: Uuid) -> MatchResult<Vec<ContactCard>> {
        let mut partner_ids: Vec<Uuid> = Vec::new();
        for connection in self.store.connections_for(viewer_id).await? {
            let partner = connection.counterpart(viewer_id);
            if connection.status == ConnectionStatus::Accepted && !partner_ids.contains(&partner) {
                partner_ids.push(partner);
            }
        }

        let profiles = self.profiles_by_id(&partner_ids).await?;
        Ok(partner_ids
            .iter()
            .filter_map(|id| profiles.get(id))
            .map(Profile::contact_card)
            .collect())
    }

    async fn profiles_by_id(&self, user_ids: &[Uuid]) -> MatchResult<HashMap<Uuid, Profile>> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }
        Ok(self
            .store
            .profiles_by_users(user_ids)
            .await?
            .into_iter()
            .map(|p| (p.user_id, p))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::test_support::{engine, member};
    use crate::models::{Decision, Gender, GenderPreference};

    #[tokio::test]
    async fn test_inbox_splits_received_and_sent() {
        let (engine, store) = engine();
        let viewer = member(&store, "Sarah", Gender::Female, GenderPreference::Male, "0501111111").await;
        let admirer = member(&store, "David", Gender::Male, GenderPreference::Female, "0502222222").await;
        let crush = member(&store, "Michael", Gender::Male, GenderPreference::Female, "0503333333").await;

        engine.propose(admirer, viewer).await.unwrap();
        engine.propose(viewer, crush).await.unwrap();

        let inbox = engine.inbox(viewer).await.unwrap();
        assert_eq!(inbox.received.len(), 1);
        assert_eq!(inbox.received[0].profile.user_id, admirer);
        assert_eq!(inbox.sent.len(), 1);
        assert_eq!(inbox.sent[0].profile.user_id, crush);

        let crush_inbox = engine.inbox(crush).await.unwrap();
        assert_eq!(crush_inbox.received.len(), 1);
        assert!(crush_inbox.sent.is_empty());
    }

    #[tokio::test]
    async fn test_resolved_requests_leave_both_inboxes() {
        let (engine, store) = engine();
        let a = member(&store, "Rachel", Gender::Female, GenderPreference::Male, "0501111111").await;
        let b = member(&store, "Eli", Gender::Male, GenderPreference::Female, "0502222222").await;
        let c = member(&store, "Noam", Gender::Male, GenderPreference::Female, "0503333333").await;

        engine.propose(a, b).await.unwrap();
        engine.propose(a, c).await.unwrap();
        engine.respond(b, a, Decision::Reject).await.unwrap();
        engine.cancel(a, c).await.unwrap();

        for user in [a, b, c] {
            let inbox = engine.inbox(user).await.unwrap();
            assert!(inbox.received.is_empty() && inbox.sent.is_empty());
        }
    }

    #[tokio::test]
    async fn test_contact_cards_only_reach_matched_members() {
        let (engine, store) = engine();
        let a = member(&store, "Leah", Gender::Female, GenderPreference::Male, "0501111111").await;
        let b = member(&store, "Aaron", Gender::Male, GenderPreference::Female, "0502222222").await;
        let stranger = member(&store, "Yosef", Gender::Male, GenderPreference::Female, "0503333333").await;

        engine.propose(a, b).await.unwrap();
        engine.propose(stranger, a).await.unwrap();
        assert!(engine.matches(a).await.unwrap().is_empty());

        engine.respond(b, a, Decision::Accept).await.unwrap();

        let for_a = engine.matches(a).await.unwrap();
        assert_eq!(for_a.len(), 1);
        assert_eq!(for_a[0].user_id, b);
        assert_eq!(for_a[0].phone.as_deref(), Some("0502222222"));

        let for_b = engine.matches(b).await.unwrap();
        assert_eq!(for_b[0].phone.as_deref(), Some("0501111111"));

        assert!(engine.matches(stranger).await.unwrap().is_empty());
    }
}
