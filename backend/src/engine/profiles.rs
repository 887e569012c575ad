use uuid::Uuid;

use super::MatchEngine;
use crate::error::{MatchError, MatchResult};
use crate::models::{Profile, ProfileDraft};
use crate::utils::validation::normalize_phone;

impl MatchEngine {
    pub async fn profile(&self, viewer_id: Uuid) -> MatchResult<Profile> {
        self.require_profile(viewer_id).await
    }

    /// Creates the viewer's profile on first save and updates it afterwards.
    pub async fn save_profile(&self, viewer_id: Uuid, draft: ProfileDraft) -> MatchResult<Profile> {
        let draft = self.rules.check_draft(draft)?;
        let profile = self.store.upsert_profile(viewer_id, &draft).await?;
        tracing::info!("Profile saved for {}", viewer_id);
        Ok(profile)
    }

    pub async fn update_phone(&self, viewer_id: Uuid, phone: Option<&str>) -> MatchResult<Profile> {
        let phone = normalize_phone(phone)?;
        self.store
            .update_phone(viewer_id, phone.as_deref())
            .await?
            .ok_or(MatchError::NotFound("Profile"))
    }

    pub async fn set_picture(&self, viewer_id: Uuid, url: &str) -> MatchResult<Profile> {
        self.store
            .update_picture(viewer_id, url)
            .await?
            .ok_or(MatchError::NotFound("Profile"))
    }

    /// Lets an admin create a profile on behalf of another identity.
    pub async fn admin_create_profile(
        &self,
        admin_id: Uuid,
        user_id: Uuid,
        draft: ProfileDraft,
    ) -> MatchResult<Profile> {
        let is_admin = self
            .store
            .profile_by_user(admin_id)
            .await?
            .map(|p| p.is_admin)
            .unwrap_or(false);
        if !is_admin {
            tracing::warn!("Non-admin {} attempted to create a profile", admin_id);
            return Err(MatchError::Forbidden);
        }

        let draft = self.rules.check_draft(draft)?;
        let profile = self.store.create_profile(user_id, &draft).await?;
        tracing::info!("Admin {} created profile for {}", admin_id, user_id);
        Ok(profile)
    }
}
