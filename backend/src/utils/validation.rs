use once_cell::sync::Lazy;
use regex::Regex;

use crate::constants::*;
use crate::error::{MatchError, MatchResult};
use crate::models::ProfileDraft;

static PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9][0-9 ()\-]*[0-9]$").expect("phone pattern compiles"));

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern compiles"));

/// Bounds applied to every profile write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileRules {
    pub min_age: i32,
    pub max_age: i32,
}

impl Default for ProfileRules {
    fn default() -> Self {
        Self {
            min_age: DEFAULT_MIN_AGE,
            max_age: DEFAULT_MAX_AGE,
        }
    }
}

impl ProfileRules {
    /// Checks a draft and returns it with surrounding whitespace removed.
    pub fn check_draft(&self, draft: ProfileDraft) -> MatchResult<ProfileDraft> {
        let name = draft.name.trim().to_string();
        if name.is_empty() {
            return Err(MatchError::validation("Name is required"));
        }
        if name.chars().count() > NAME_CHAR_LIMIT {
            return Err(MatchError::validation(format!(
                "Name must be at most {} characters",
                NAME_CHAR_LIMIT
            )));
        }

        if draft.age < self.min_age || draft.age > self.max_age {
            return Err(MatchError::validation(format!(
                "Age must be between {} and {}",
                self.min_age, self.max_age
            )));
        }

        let bio = draft.bio.trim().to_string();
        if bio.chars().count() > BIO_CHAR_LIMIT {
            return Err(MatchError::validation(format!(
                "Bio must be at most {} characters",
                BIO_CHAR_LIMIT
            )));
        }

        let profile_pic_url = draft
            .profile_pic_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        Ok(ProfileDraft {
            name,
            bio,
            profile_pic_url,
            ..draft
        })
    }
}

/// Blank input clears the phone number.
pub fn normalize_phone(raw: Option<&str>) -> MatchResult<Option<String>> {
    let Some(phone) = raw.map(str::trim).filter(|p| !p.is_empty()) else {
        return Ok(None);
    };

    let length_ok = (PHONE_MIN_LENGTH..=PHONE_MAX_LENGTH).contains(&phone.len());
    if !length_ok || !PHONE_PATTERN.is_match(phone) {
        return Err(MatchError::validation("Phone number is not valid"));
    }

    Ok(Some(phone.to_string()))
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// File extension for an accepted picture content type.
pub fn picture_extension(content_type: &str) -> Option<&'static str> {
    match content_type.split(';').next().unwrap_or("").trim() {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}
