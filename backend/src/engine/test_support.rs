use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use super::MatchEngine;
use crate::db::{MatchStore, MemoryStore};
use crate::models::{Connection, ConnectionStatus, Gender, GenderPreference, Profile, ProfileDraft};
use crate::utils::ProfileRules;

pub fn profile(gender: Gender, preferred: GenderPreference) -> Profile {
    let now = Utc::now();
    Profile {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        name: "Member".to_string(),
        age: 30,
        gender: Some(gender),
        preferred_genders: Some(preferred),
        bio: String::new(),
        profile_pic_url: None,
        phone: None,
        is_admin: false,
        created_at: now,
        updated_at: now,
    }
}

pub fn connection(requester_id: Uuid, target_id: Uuid, status: ConnectionStatus) -> Connection {
    let now = Utc::now();
    Connection {
        id: Uuid::new_v4(),
        requester_id,
        target_id,
        status,
        created_at: now,
        updated_at: now,
    }
}

pub fn engine() -> (MatchEngine, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let engine = MatchEngine::new(store.clone(), ProfileRules::default());
    (engine, store)
}

pub async fn member(
    store: &MemoryStore,
    name: &str,
    gender: Gender,
    preferred: GenderPreference,
    phone: &str,
) -> Uuid {
    let user_id = Uuid::new_v4();
    let draft = ProfileDraft {
        name: name.to_string(),
        age: 29,
        gender,
        preferred_genders: preferred,
        bio: format!("{} likes long Shabbat lunches", name),
        profile_pic_url: None,
    };
    store.upsert_profile(user_id, &draft).await.unwrap();
    store.update_phone(user_id, Some(phone)).await.unwrap();
    user_id
}
