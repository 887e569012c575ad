use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "gender", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "gender_preference", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum GenderPreference {
    Male,
    Female,
    Both,
}

impl GenderPreference {
    pub fn accepts(self, gender: Gender) -> bool {
        matches!(
            (self, gender),
            (GenderPreference::Both, _)
                | (GenderPreference::Male, Gender::Male)
                | (GenderPreference::Female, Gender::Female)
        )
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub age: i32,
    pub gender: Option<Gender>,
    pub preferred_genders: Option<GenderPreference>,
    pub bio: String,
    pub profile_pic_url: Option<String>,
    pub phone: Option<String>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// The view shown to other members before any match: no phone, no admin flag.
    pub fn public(&self) -> PublicProfile {
        PublicProfile {
            user_id: self.user_id,
            name: self.name.clone(),
            age: self.age,
            gender: self.gender,
            bio: self.bio.clone(),
            profile_pic_url: self.profile_pic_url.clone(),
        }
    }

    /// Contact details, only ever handed to a confirmed match.
    pub fn contact_card(&self) -> ContactCard {
        ContactCard {
            user_id: self.user_id,
            name: self.name.clone(),
            phone: self.phone.clone(),
            profile_pic_url: self.profile_pic_url.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicProfile {
    pub user_id: Uuid,
    pub name: String,
    pub age: i32,
    pub gender: Option<Gender>,
    pub bio: String,
    pub profile_pic_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactCard {
    pub user_id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub profile_pic_url: Option<String>,
}

/// Fields a member (or an admin) submits when creating or editing a profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileDraft {
    pub name: String,
    pub age: i32,
    pub gender: Gender,
    pub preferred_genders: GenderPreference,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub profile_pic_url: Option<String>,
}
