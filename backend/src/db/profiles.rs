use crate::models::{Profile, ProfileDraft};
use sqlx::PgPool;
use uuid::Uuid;

pub async fn get_profile_by_user_id(pool: &PgPool, user_id: Uuid) -> Result<Option<Profile>, sqlx::Error> {
    sqlx::query_as::<_, Profile>(
        r#"
        SELECT id, user_id, name, age, gender, preferred_genders, bio,
               profile_pic_url, phone, is_admin, created_at, updated_at
        FROM profiles
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub async fn get_profiles_by_user_ids(pool: &PgPool, user_ids: &[Uuid]) -> Result<Vec<Profile>, sqlx::Error> {
    sqlx::query_as::<_, Profile>(
        r#"
        SELECT id, user_id, name, age, gender, preferred_genders, bio,
               profile_pic_url, phone, is_admin, created_at, updated_at
        FROM profiles
        WHERE user_id = ANY($1)
        ORDER BY created_at ASC
        "#,
    )
    .bind(user_ids)
    .fetch_all(pool)
    .await
}

/// Every profile except the viewer's, oldest first.
pub async fn get_other_profiles(pool: &PgPool, user_id: Uuid) -> Result<Vec<Profile>, sqlx::Error> {
    sqlx::query_as::<_, Profile>(
        r#"
        SELECT id, user_id, name, age, gender, preferred_genders, bio,
               profile_pic_url, phone, is_admin, created_at, updated_at
        FROM profiles
        WHERE user_id <> $1
        ORDER BY created_at ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Creates the profile or rewrites the editable fields of an existing one.
/// A missing picture URL keeps the stored picture.
pub async fn upsert_profile(pool: &PgPool, user_id: Uuid, draft: &ProfileDraft) -> Result<Profile, sqlx::Error> {
    sqlx::query_as::<_, Profile>(
        r#"
        INSERT INTO profiles (user_id, name, age, gender, preferred_genders, bio, profile_pic_url)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (user_id) DO UPDATE SET
            name = EXCLUDED.name,
            age = EXCLUDED.age,
            gender = EXCLUDED.gender,
            preferred_genders = EXCLUDED.preferred_genders,
            bio = EXCLUDED.bio,
            profile_pic_url = COALESCE(EXCLUDED.profile_pic_url, profiles.profile_pic_url),
            updated_at = NOW()
        RETURNING id, user_id, name, age, gender, preferred_genders, bio,
                  profile_pic_url, phone, is_admin, created_at, updated_at
        "#,
    )
    .bind(user_id)
    .bind(&draft.name)
    .bind(draft.age)
    .bind(draft.gender)
    .bind(draft.preferred_genders)
    .bind(&draft.bio)
    .bind(&draft.profile_pic_url)
    .fetch_one(pool)
    .await
}

/// Plain insert; fails with a unique violation if the identity already has a profile.
pub async fn create_profile(pool: &PgPool, user_id: Uuid, draft: &ProfileDraft) -> Result<Profile, sqlx::Error> {
    sqlx::query_as::<_, Profile>(
        r#"
        INSERT INTO profiles (user_id, name, age, gender, preferred_genders, bio, profile_pic_url)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, user_id, name, age, gender, preferred_genders, bio,
                  profile_pic_url, phone, is_admin, created_at, updated_at
        "#,
    )
    .bind(user_id)
    .bind(&draft.name)
    .bind(draft.age)
    .bind(draft.gender)
    .bind(draft.preferred_genders)
    .bind(&draft.bio)
    .bind(&draft.profile_pic_url)
    .fetch_one(pool)
    .await
}

pub async fn update_phone(pool: &PgPool, user_id: Uuid, phone: Option<&str>) -> Result<Option<Profile>, sqlx::Error> {
    sqlx::query_as::<_, Profile>(
        r#"
        UPDATE profiles
        SET phone = $2, updated_at = NOW()
        WHERE user_id = $1
        RETURNING id, user_id, name, age, gender, preferred_genders, bio,
                  profile_pic_url, phone, is_admin, created_at, updated_at
        "#,
    )
    .bind(user_id)
    .bind(phone)
    .fetch_optional(pool)
    .await
}

pub async fn update_picture(pool: &PgPool, user_id: Uuid, url: &str) -> Result<Option<Profile>, sqlx::Error> {
    sqlx::query_as::<_, Profile>(
        r#"
        UPDATE profiles
        SET profile_pic_url = $2, updated_at = NOW()
        WHERE user_id = $1
        RETURNING id, user_id, name, age, gender, preferred_genders, bio,
                  profile_pic_url, phone, is_admin, created_at, updated_at
        "#,
    )
    .bind(user_id)
    .bind(url)
    .fetch_optional(pool)
    .await
}

/// Admin rights are granted out of band (seed_user), never through the API.
pub async fn set_admin(pool: &PgPool, user_id: Uuid, is_admin: bool) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE profiles
        SET is_admin = $2, updated_at = NOW()
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .bind(is_admin)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}
