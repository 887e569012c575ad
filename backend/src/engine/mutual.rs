use uuid::Uuid;

use super::MatchEngine;
use crate::error::{MatchError, MatchResult};
use crate::models::{Connection, ConnectionStatus, MatchEvent};

/// An accepted row in either direction means both members said yes: the
/// requester by asking, the target by accepting.
pub fn is_mutual(a: Uuid, b: Uuid, connections: &[Connection]) -> bool {
    connections
        .iter()
        .any(|c| (c.is_between(a, b) || c.is_between(b, a)) && c.status == ConnectionStatus::Accepted)
}

impl MatchEngine {
    /// Runs after a transition has been written. Only the caller that won the
    /// conditional write reaches this, so each pair yields one event.
    pub(super) async fn detect_match(&self, connection: &Connection) -> MatchResult<Option<MatchEvent>> {
        if connection.status != ConnectionStatus::Accepted {
            return Ok(None);
        }

        let (requester_id, target_id) = (connection.requester_id, connection.target_id);
        let pair_rows: Vec<Connection> = self
            .store
            .connections_for(requester_id)
            .await?
            .into_iter()
            .filter(|c| c.counterpart(requester_id) == target_id)
            .collect();
        if !is_mutual(requester_id, target_id, &pair_rows) {
            return Ok(None);
        }

        let profiles = self.store.profiles_by_users(&[requester_id, target_id]).await?;
        let card_for = |user_id: Uuid| {
            profiles
                .iter()
                .find(|p| p.user_id == user_id)
                .map(|p| p.contact_card())
                .ok_or(MatchError::NotFound("Profile"))
        };

        let event = MatchEvent {
            connection_id: connection.id,
            members: [card_for(requester_id)?, card_for(target_id)?],
            matched_at: connection.updated_at,
        };

        tracing::info!("Mutual match confirmed: {} <-> {}", requester_id, target_id);
        if self.events.send(event.clone()).is_err() {
            tracing::debug!("No match event subscribers");
        }

        Ok(Some(event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::connection;

    #[test]
    fn test_accepted_row_in_either_direction_is_mutual() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

        assert!(is_mutual(a, b, &[connection(a, b, ConnectionStatus::Accepted)]));
        assert!(is_mutual(a, b, &[connection(b, a, ConnectionStatus::Accepted)]));
        assert!(!is_mutual(a, b, &[connection(a, b, ConnectionStatus::Pending)]));
        assert!(!is_mutual(
            a,
            b,
            &[
                connection(a, b, ConnectionStatus::Rejected),
                connection(b, a, ConnectionStatus::Cancelled),
            ]
        ));
    }

    #[test]
    fn test_other_pairs_do_not_count() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        assert!(!is_mutual(a, b, &[connection(a, c, ConnectionStatus::Accepted)]));
    }
}
