use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::profiles::{ContactCard, PublicProfile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "connection_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Pending,
    Accepted,
    Rejected,
    Cancelled,
    /// The requester skipped the target in their candidate feed.
    Passed,
}

impl ConnectionStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, ConnectionStatus::Pending)
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Connection {
    pub id: Uuid,
    pub requester_id: Uuid,
    pub target_id: Uuid,
    pub status: ConnectionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Connection {
    pub fn is_between(&self, from: Uuid, to: Uuid) -> bool {
        self.requester_id == from && self.target_id == to
    }

    /// The other member of the pair, seen from `user_id`.
    pub fn counterpart(&self, user_id: Uuid) -> Uuid {
        if self.requester_id == user_id {
            self.target_id
        } else {
            self.requester_id
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Accept,
    Reject,
}

impl Decision {
    pub fn resulting_status(self) -> ConnectionStatus {
        match self {
            Decision::Accept => ConnectionStatus::Accepted,
            Decision::Reject => ConnectionStatus::Rejected,
        }
    }
}

/// Emitted once when a pair becomes a confirmed mutual match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchEvent {
    pub connection_id: Uuid,
    pub members: [ContactCard; 2],
    pub matched_at: DateTime<Utc>,
}

impl MatchEvent {
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.members.iter().any(|m| m.user_id == user_id)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TransitionOutcome {
    pub connection: Connection,
    pub matched: Option<MatchEvent>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestView {
    pub connection_id: Uuid,
    pub profile: PublicProfile,
    pub requested_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Inbox {
    pub received: Vec<RequestView>,
    pub sent: Vec<RequestView>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CandidateFeed {
    pub candidates: Vec<PublicProfile>,
    pub needs_profile: bool,
}
