use std::collections::HashSet;

use uuid::Uuid;

use super::MatchEngine;
use crate::error::MatchResult;
use crate::models::{CandidateFeed, Connection, ConnectionStatus, Profile};

/// Symmetric preference rule: each side's gender is accepted by the other
/// side's preference. Profiles missing either field never match.
pub fn is_compatible(viewer: &Profile, candidate: &Profile) -> bool {
    let (Some(viewer_gender), Some(viewer_pref)) = (viewer.gender, viewer.preferred_genders) else {
        return false;
    };
    let (Some(candidate_gender), Some(candidate_pref)) = (candidate.gender, candidate.preferred_genders) else {
        return false;
    };

    viewer_pref.accepts(candidate_gender) && candidate_pref.accepts(viewer_gender)
}

/// Whether this row keeps the counterpart out of the viewer's candidates.
fn hides_counterpart(connection: &Connection, viewer_id: Uuid) -> bool {
    match connection.status {
        ConnectionStatus::Accepted | ConnectionStatus::Rejected => true,
        ConnectionStatus::Pending | ConnectionStatus::Passed => connection.requester_id == viewer_id,
        ConnectionStatus::Cancelled => false,
    }
}

/// Keeps `pool` order. `connections` must hold every row involving the viewer.
pub fn filter_candidates(viewer: &Profile, pool: Vec<Profile>, connections: &[Connection]) -> Vec<Profile> {
    if viewer.gender.is_none() || viewer.preferred_genders.is_none() {
        return Vec::new();
    }

    let hidden: HashSet<Uuid> = connections
        .iter()
        .filter(|c| hides_counterpart(c, viewer.user_id))
        .map(|c| c.counterpart(viewer.user_id))
        .collect();

    pool.into_iter()
        .filter(|candidate| candidate.user_id != viewer.user_id)
        .filter(|candidate| !hidden.contains(&candidate.user_id))
        .filter(|candidate| is_compatible(viewer, candidate))
        .collect()
}

impl MatchEngine {
    pub async fn list_candidates(&self, viewer_id: Uuid) -> MatchResult<CandidateFeed> {
        let Some(viewer) = self.store.profile_by_user(viewer_id).await? else {
            tracing::debug!("Viewer {} has no profile yet", viewer_id);
            return Ok(CandidateFeed {
                candidates: Vec::new(),
                needs_profile: true,
            });
        };

        let pool = self.store.other_profiles(viewer_id).await?;
        let connections = self.store.connections_for(viewer_id).await?;
        let pool_size = pool.len();
        let candidates = filter_candidates(&viewer, pool, &connections);

        tracing::debug!(
            "Viewer {}: {} of {} profiles eligible",
            viewer_id,
            candidates.len(),
            pool_size
        );

        Ok(CandidateFeed {
            candidates: candidates.iter().map(Profile::public).collect(),
            needs_profile: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::{connection, profile};
    use crate::models::{Gender, GenderPreference};

    #[test]
    fn test_preference_rule_is_symmetric() {
        let woman_seeking_men = profile(Gender::Female, GenderPreference::Male);
        let man_seeking_women = profile(Gender::Male, GenderPreference::Female);
        let man_seeking_men = profile(Gender::Male, GenderPreference::Male);
        let man_open = profile(Gender::Male, GenderPreference::Both);

        assert!(is_compatible(&woman_seeking_men, &man_seeking_women));
        assert!(is_compatible(&man_seeking_women, &woman_seeking_men));
        assert!(!is_compatible(&woman_seeking_men, &man_seeking_men));
        assert!(is_compatible(&woman_seeking_men, &man_open));
        assert!(!is_compatible(&man_seeking_men, &woman_seeking_men));
    }

    #[test]
    fn test_every_candidate_satisfies_both_preferences() {
        let viewer = profile(Gender::Female, GenderPreference::Both);
        let pool = vec![
            profile(Gender::Male, GenderPreference::Female),
            profile(Gender::Male, GenderPreference::Male),
            profile(Gender::Female, GenderPreference::Both),
            profile(Gender::Female, GenderPreference::Male),
            profile(Gender::Male, GenderPreference::Both),
        ];

        let result = filter_candidates(&viewer, pool, &[]);

        assert_eq!(result.len(), 3);
        for candidate in &result {
            let gender = candidate.gender.unwrap();
            assert!(viewer.preferred_genders.unwrap().accepts(gender));
            assert!(candidate.preferred_genders.unwrap().accepts(viewer.gender.unwrap()));
        }
    }

    #[test]
    fn test_viewer_never_sees_themselves() {
        let viewer = profile(Gender::Female, GenderPreference::Both);
        let mut twin = viewer.clone();
        twin.id = Uuid::new_v4();

        let result = filter_candidates(&viewer, vec![twin], &[]);
        assert!(result.is_empty());
    }

    #[test]
    fn test_unset_preferences_fail_closed() {
        let mut viewer = profile(Gender::Male, GenderPreference::Female);
        viewer.preferred_genders = None;
        let pool = vec![profile(Gender::Female, GenderPreference::Male)];
        assert!(filter_candidates(&viewer, pool, &[]).is_empty());

        let viewer = profile(Gender::Male, GenderPreference::Female);
        let mut undecided = profile(Gender::Female, GenderPreference::Male);
        undecided.preferred_genders = None;
        assert!(filter_candidates(&viewer, vec![undecided], &[]).is_empty());
    }

    #[test]
    fn test_connection_rows_hide_candidates() {
        let viewer = profile(Gender::Female, GenderPreference::Male);
        let requested = profile(Gender::Male, GenderPreference::Female);
        let admirer = profile(Gender::Male, GenderPreference::Female);
        let matched = profile(Gender::Male, GenderPreference::Female);
        let declined = profile(Gender::Male, GenderPreference::Female);
        let withdrawn = profile(Gender::Male, GenderPreference::Female);
        let fresh = profile(Gender::Male, GenderPreference::Female);

        let connections = vec![
            connection(viewer.user_id, requested.user_id, ConnectionStatus::Pending),
            connection(admirer.user_id, viewer.user_id, ConnectionStatus::Pending),
            connection(matched.user_id, viewer.user_id, ConnectionStatus::Accepted),
            connection(viewer.user_id, declined.user_id, ConnectionStatus::Rejected),
            connection(viewer.user_id, withdrawn.user_id, ConnectionStatus::Cancelled),
        ];
        let pool = vec![
            requested.clone(),
            admirer.clone(),
            matched,
            declined,
            withdrawn.clone(),
            fresh.clone(),
        ];

        let ids: Vec<Uuid> = filter_candidates(&viewer, pool, &connections)
            .into_iter()
            .map(|p| p.user_id)
            .collect();

        assert_eq!(ids, vec![admirer.user_id, withdrawn.user_id, fresh.user_id]);
    }

    #[test]
    fn test_pass_hides_only_from_the_member_who_passed() {
        let viewer = profile(Gender::Female, GenderPreference::Male);
        let skipped = profile(Gender::Male, GenderPreference::Female);
        let connections = vec![connection(viewer.user_id, skipped.user_id, ConnectionStatus::Passed)];

        assert!(filter_candidates(&viewer, vec![skipped.clone()], &connections).is_empty());

        let seen_by_skipped = filter_candidates(&skipped, vec![viewer.clone()], &connections);
        assert_eq!(seen_by_skipped.len(), 1);
    }
}
