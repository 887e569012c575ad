use uuid::Uuid;

use super::{MatchEngine, is_compatible, is_mutual};
use crate::error::{MatchError, MatchResult};
use crate::models::{Connection, ConnectionStatus, Decision, TransitionOutcome};

const ALREADY_RESOLVED: &str = "This request has already been resolved";

impl MatchEngine {
    /// Sends a connection request. If the target already asked the requester,
    /// the two requests meet and the pair is matched on the spot.
    pub async fn propose(&self, requester_id: Uuid, target_id: Uuid) -> MatchResult<TransitionOutcome> {
        if requester_id == target_id {
            return Err(MatchError::validation("You cannot connect with yourself"));
        }

        let requester = self.require_profile(requester_id).await?;
        let target = self
            .store
            .profile_by_user(target_id)
            .await?
            .ok_or(MatchError::NotFound("Member"))?;
        if !is_compatible(&requester, &target) {
            return Err(MatchError::validation("This member is not a compatible match"));
        }

        let outgoing = self.store.latest_connection(requester_id, target_id).await?;
        let incoming = self.store.latest_connection(target_id, requester_id).await?;
        let statuses = [
            outgoing.as_ref().map(|c| c.status),
            incoming.as_ref().map(|c| c.status),
        ];

        if statuses.contains(&Some(ConnectionStatus::Accepted)) {
            return Err(MatchError::Conflict("Already connected"));
        }
        if statuses[0] == Some(ConnectionStatus::Pending) {
            return Err(MatchError::Conflict("Connection already requested"));
        }
        if statuses.contains(&Some(ConnectionStatus::Rejected)) {
            return Err(MatchError::validation("This connection was declined"));
        }

        if let Some(request) = incoming.filter(|c| c.status == ConnectionStatus::Pending) {
            if let Some(outcome) = self.accept_crossing(requester_id, target_id, &request).await? {
                return Ok(outcome);
            }
            // The incoming request was resolved meanwhile; fall through to a plain request.
        }

        match self
            .store
            .create_connection(requester_id, target_id, ConnectionStatus::Pending)
            .await
        {
            Ok(connection) => {
                tracing::info!("Connection requested: {} -> {}", requester_id, target_id);
                Ok(TransitionOutcome {
                    connection,
                    matched: None,
                })
            }
            // The target's own request landed between the read and the insert.
            Err(MatchError::Conflict(_)) => {
                let crossing = self
                    .store
                    .latest_connection(target_id, requester_id)
                    .await?
                    .filter(|c| c.status == ConnectionStatus::Pending);
                let Some(request) = crossing else {
                    return Err(MatchError::Conflict("Connection already requested"));
                };
                self.accept_crossing(requester_id, target_id, &request)
                    .await?
                    .ok_or(MatchError::Conflict("Connection already requested"))
            }
            Err(e) => Err(e),
        }
    }

    /// Accepts the target's pending request on the requester's behalf. A
    /// single conditional write; None when someone else resolved it first.
    async fn accept_crossing(
        &self,
        requester_id: Uuid,
        target_id: Uuid,
        request: &Connection,
    ) -> MatchResult<Option<TransitionOutcome>> {
        let Some(connection) = self
            .store
            .transition_connection(request.id, ConnectionStatus::Pending, ConnectionStatus::Accepted)
            .await?
        else {
            return Ok(None);
        };
        tracing::info!("{} answered {}'s pending request", requester_id, target_id);

        let matched = self.detect_match(&connection).await?;
        Ok(Some(TransitionOutcome { connection, matched }))
    }

    /// Hides `target_id` from the viewer's candidates. Passing twice returns
    /// the existing row.
    pub async fn pass(&self, viewer_id: Uuid, target_id: Uuid) -> MatchResult<Connection> {
        if viewer_id == target_id {
            return Err(MatchError::validation("You cannot pass on yourself"));
        }

        self.require_profile(viewer_id).await?;
        if self.store.profile_by_user(target_id).await?.is_none() {
            return Err(MatchError::NotFound("Member"));
        }

        let outgoing = self.store.latest_connection(viewer_id, target_id).await?;
        let incoming = self.store.latest_connection(target_id, viewer_id).await?;
        if let Some(existing) = outgoing.as_ref().filter(|c| c.status == ConnectionStatus::Passed) {
            return Ok(existing.clone());
        }
        if outgoing.as_ref().is_some_and(|c| c.status == ConnectionStatus::Pending) {
            return Err(MatchError::Conflict("Connection already requested"));
        }
        let connected = [outgoing.as_ref(), incoming.as_ref()]
            .into_iter()
            .flatten()
            .any(|c| c.status == ConnectionStatus::Accepted);
        if connected {
            return Err(MatchError::Conflict("Already connected"));
        }

        let connection = self
            .store
            .create_connection(viewer_id, target_id, ConnectionStatus::Passed)
            .await?;
        tracing::info!("{} passed on {}", viewer_id, target_id);
        Ok(connection)
    }

    /// Accepts or rejects a pending request addressed to `viewer_id`.
    pub async fn respond(
        &self,
        viewer_id: Uuid,
        requester_id: Uuid,
        decision: Decision,
    ) -> MatchResult<TransitionOutcome> {
        let request = self.pending_request(requester_id, viewer_id).await?;

        // A request that raced with the pair's match is only closed out.
        let already_matched = decision == Decision::Accept
            && is_mutual(viewer_id, requester_id, &self.store.connections_for(viewer_id).await?);

        let connection = self
            .store
            .transition_connection(request.id, ConnectionStatus::Pending, decision.resulting_status())
            .await?
            .ok_or_else(|| MatchError::validation(ALREADY_RESOLVED))?;
        tracing::info!(
            "{} responded to request from {}: {:?}",
            viewer_id,
            requester_id,
            connection.status
        );

        if already_matched {
            return Ok(TransitionOutcome {
                connection,
                matched: None,
            });
        }
        let matched = self.detect_match(&connection).await?;
        Ok(TransitionOutcome { connection, matched })
    }

    /// Withdraws the viewer's own pending request to `target_id`.
    pub async fn cancel(&self, viewer_id: Uuid, target_id: Uuid) -> MatchResult<Connection> {
        let request = self.pending_request(viewer_id, target_id).await?;

        let connection = self
            .store
            .transition_connection(request.id, ConnectionStatus::Pending, ConnectionStatus::Cancelled)
            .await?
            .ok_or_else(|| MatchError::validation(ALREADY_RESOLVED))?;
        tracing::info!("Connection request withdrawn: {} -> {}", viewer_id, target_id);

        Ok(connection)
    }

    async fn pending_request(&self, requester_id: Uuid, target_id: Uuid) -> MatchResult<Connection> {
        let latest = self
            .store
            .latest_connection(requester_id, target_id)
            .await?
            .ok_or(MatchError::NotFound("Connection request"))?;

        if latest.status.is_terminal() {
            return Err(MatchError::validation(ALREADY_RESOLVED));
        }
        Ok(latest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::{engine, member};
    use crate::db::MatchStore;
    use crate::models::{Gender, GenderPreference};

    #[tokio::test]
    async fn test_accepting_a_request_fires_one_match_event_with_both_phones() {
        let (engine, store) = engine();
        let mut events = engine.subscribe();
        let a = member(&store, "Sarah", Gender::Female, GenderPreference::Male, "+972 50 111 1111").await;
        let b = member(&store, "David", Gender::Male, GenderPreference::Female, "+972 50 222 2222").await;

        let proposed = engine.propose(a, b).await.unwrap();
        assert_eq!(proposed.connection.status, ConnectionStatus::Pending);
        assert!(proposed.matched.is_none());

        let accepted = engine.respond(b, a, Decision::Accept).await.unwrap();
        assert_eq!(accepted.connection.status, ConnectionStatus::Accepted);
        let event = accepted.matched.expect("accepting should confirm the match");
        assert!(event.involves(a) && event.involves(b));
        let phones: Vec<_> = event.members.iter().map(|m| m.phone.clone().unwrap()).collect();
        assert!(phones.contains(&"+972 50 111 1111".to_string()));
        assert!(phones.contains(&"+972 50 222 2222".to_string()));

        assert_eq!(events.try_recv().unwrap(), event);
        assert!(events.try_recv().is_err());

        // Nothing left to accept.
        let err = engine.respond(b, a, Decision::Accept).await.unwrap_err();
        assert!(matches!(err, MatchError::Validation(_)));
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_duplicate_propose_conflicts_until_resolved() {
        let (engine, store) = engine();
        let a = member(&store, "Rachel", Gender::Female, GenderPreference::Male, "0501234567").await;
        let b = member(&store, "Michael", Gender::Male, GenderPreference::Female, "0507654321").await;

        engine.propose(a, b).await.unwrap();
        let err = engine.propose(a, b).await.unwrap_err();
        assert!(matches!(err, MatchError::Conflict(_)));

        engine.cancel(a, b).await.unwrap();
        let again = engine.propose(a, b).await.unwrap();
        assert_eq!(again.connection.status, ConnectionStatus::Pending);
    }

    #[tokio::test]
    async fn test_crossing_requests_become_a_match() {
        let (engine, store) = engine();
        let mut events = engine.subscribe();
        let a = member(&store, "Leah", Gender::Female, GenderPreference::Male, "0501111111").await;
        let b = member(&store, "Aaron", Gender::Male, GenderPreference::Female, "0502222222").await;

        engine.propose(b, a).await.unwrap();
        let outcome = engine.propose(a, b).await.unwrap();

        assert_eq!(outcome.connection.status, ConnectionStatus::Accepted);
        assert!(outcome.connection.is_between(b, a));
        assert!(outcome.matched.is_some());
        assert!(events.try_recv().is_ok());
        assert!(events.try_recv().is_err());
        // The accepted request alone records the match.
        assert_eq!(store.connection_count().await, 1);

        let err = engine.propose(b, a).await.unwrap_err();
        assert!(matches!(err, MatchError::Conflict("Already connected")));
    }

    #[tokio::test]
    async fn test_rejection_is_terminal_and_hides_both_sides() {
        let (engine, store) = engine();
        let c = member(&store, "Dina", Gender::Female, GenderPreference::Male, "0503333333").await;
        let d = member(&store, "Eli", Gender::Male, GenderPreference::Female, "0504444444").await;

        engine.propose(c, d).await.unwrap();
        let outcome = engine.respond(d, c, Decision::Reject).await.unwrap();
        assert_eq!(outcome.connection.status, ConnectionStatus::Rejected);
        assert!(outcome.matched.is_none());

        assert!(engine.list_candidates(c).await.unwrap().candidates.is_empty());
        assert!(engine.list_candidates(d).await.unwrap().candidates.is_empty());

        let err = engine.propose(c, d).await.unwrap_err();
        assert!(matches!(err, MatchError::Validation(_)));
        let err = engine.propose(d, c).await.unwrap_err();
        assert!(matches!(err, MatchError::Validation(_)));
    }

    #[tokio::test]
    async fn test_cancel_requires_a_pending_request() {
        let (engine, store) = engine();
        let a = member(&store, "Miriam", Gender::Female, GenderPreference::Male, "0505555555").await;
        let b = member(&store, "Noam", Gender::Male, GenderPreference::Female, "0506666666").await;

        let err = engine.cancel(a, b).await.unwrap_err();
        assert!(matches!(err, MatchError::NotFound(_)));

        engine.propose(a, b).await.unwrap();
        engine.respond(b, a, Decision::Accept).await.unwrap();
        let err = engine.cancel(a, b).await.unwrap_err();
        assert!(matches!(err, MatchError::Validation(_)));
    }

    #[tokio::test]
    async fn test_only_the_target_can_respond() {
        let (engine, store) = engine();
        let a = member(&store, "Tamar", Gender::Female, GenderPreference::Male, "0507777777").await;
        let b = member(&store, "Yosef", Gender::Male, GenderPreference::Female, "0508888888").await;

        engine.propose(a, b).await.unwrap();
        // `a` cannot accept her own request on `b`'s behalf.
        let err = engine.respond(a, b, Decision::Accept).await.unwrap_err();
        assert!(matches!(err, MatchError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_propose_checks_profiles_and_compatibility() {
        let (engine, store) = engine();
        let a = member(&store, "Shira", Gender::Female, GenderPreference::Male, "0509999999").await;
        let same = member(&store, "Hadas", Gender::Female, GenderPreference::Male, "0500000000").await;

        assert!(matches!(engine.propose(a, a).await, Err(MatchError::Validation(_))));
        assert!(matches!(engine.propose(a, same).await, Err(MatchError::Validation(_))));
        assert!(matches!(
            engine.propose(a, Uuid::new_v4()).await,
            Err(MatchError::NotFound("Member"))
        ));
        assert!(matches!(
            engine.propose(Uuid::new_v4(), a).await,
            Err(MatchError::NotFound("Profile"))
        ));
    }

    #[tokio::test]
    async fn test_request_left_over_from_a_match_does_not_match_again() {
        let (engine, store) = engine();
        let mut events = engine.subscribe();
        let a = member(&store, "Naomi", Gender::Female, GenderPreference::Male, "0501212121").await;
        let b = member(&store, "Ari", Gender::Male, GenderPreference::Female, "0503434343").await;

        // `a` asked `b` and the pair matched; a request from `b` written
        // concurrently survived as pending.
        let request = store.create_connection(a, b, ConnectionStatus::Pending).await.unwrap();
        store
            .transition_connection(request.id, ConnectionStatus::Pending, ConnectionStatus::Accepted)
            .await
            .unwrap();
        store.create_connection(b, a, ConnectionStatus::Pending).await.unwrap();

        let inbox = engine.inbox(a).await.unwrap();
        assert!(inbox.received.is_empty() && inbox.sent.is_empty());

        let outcome = engine.respond(a, b, Decision::Accept).await.unwrap();
        assert_eq!(outcome.connection.status, ConnectionStatus::Accepted);
        assert!(outcome.matched.is_none());
        assert!(events.try_recv().is_err());
        assert_eq!(engine.matches(a).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_pass_removes_candidate_for_the_viewer_only() {
        let (engine, store) = engine();
        let a = member(&store, "Efrat", Gender::Female, GenderPreference::Male, "0505656565").await;
        let b = member(&store, "Gil", Gender::Male, GenderPreference::Female, "0507878787").await;

        let passed = engine.pass(a, b).await.unwrap();
        assert_eq!(passed.status, ConnectionStatus::Passed);
        assert!(engine.list_candidates(a).await.unwrap().candidates.is_empty());
        assert_eq!(engine.list_candidates(b).await.unwrap().candidates.len(), 1);

        let again = engine.pass(a, b).await.unwrap();
        assert_eq!(again.id, passed.id);
        assert_eq!(store.connection_count().await, 1);

        // A pass does not block a later request either way.
        let outcome = engine.propose(b, a).await.unwrap();
        assert_eq!(outcome.connection.status, ConnectionStatus::Pending);
        assert_eq!(engine.inbox(a).await.unwrap().received.len(), 1);
    }

    #[tokio::test]
    async fn test_pass_checks_members_and_existing_rows() {
        let (engine, store) = engine();
        let a = member(&store, "Orly", Gender::Female, GenderPreference::Male, "0509090909").await;
        let b = member(&store, "Ronen", Gender::Male, GenderPreference::Female, "0501010101").await;

        assert!(matches!(engine.pass(a, a).await, Err(MatchError::Validation(_))));
        assert!(matches!(engine.pass(a, Uuid::new_v4()).await, Err(MatchError::NotFound("Member"))));
        assert!(matches!(engine.pass(Uuid::new_v4(), a).await, Err(MatchError::NotFound("Profile"))));

        engine.propose(a, b).await.unwrap();
        assert!(matches!(engine.pass(a, b).await, Err(MatchError::Conflict(_))));

        engine.respond(b, a, Decision::Accept).await.unwrap();
        assert!(matches!(engine.pass(b, a).await, Err(MatchError::Conflict("Already connected"))));
    }
}
