pub mod connections;
pub mod profiles;

pub use connections::{
    CandidateFeed, Connection, ConnectionStatus, Decision, Inbox, MatchEvent, RequestView,
    TransitionOutcome,
};
pub use profiles::{ContactCard, Gender, GenderPreference, Profile, ProfileDraft, PublicProfile};
