use async_trait::async_trait;
use reqwest::Client;
use tokio::time::Duration;
use uuid::Uuid;

use crate::constants::{PROFILE_PICTURE_FOLDER, UPSTREAM_TIMEOUT_SECS};
use crate::error::{MatchError, MatchResult};

/// Blob storage that hands back a publicly resolvable URL.
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn store(&self, path: &str, bytes: Vec<u8>, content_type: &str, access_token: &str) -> MatchResult<String>;
}

/// Object path for a new profile picture. The random suffix keeps browsers
/// from serving a cached copy of the previous picture.
pub fn picture_path(user_id: Uuid, extension: &str) -> String {
    format!("{}/{}-{}.{}", PROFILE_PICTURE_FOLDER, user_id, rand::random::<u32>(), extension)
}

#[derive(Debug, Clone)]
pub struct SupabaseStorage {
    client: Client,
    base_url: String,
    anon_key: String,
    bucket: String,
}

impl SupabaseStorage {
    pub fn new(supabase_url: &str, anon_key: String, bucket: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: format!("{}/storage/v1", supabase_url.trim_end_matches('/')),
            anon_key,
            bucket: bucket.to_string(),
        }
    }

    pub fn public_url(&self, path: &str) -> String {
        format!("{}/object/public/{}/{}", self.base_url, self.bucket, path)
    }
}

#[async_trait]
impl MediaStore for SupabaseStorage {
    async fn store(&self, path: &str, bytes: Vec<u8>, content_type: &str, access_token: &str) -> MatchResult<String> {
        let size = bytes.len();
        let response = self
            .client
            .post(format!("{}/object/{}/{}", self.base_url, self.bucket, path))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .timeout(Duration::from_secs(UPSTREAM_TIMEOUT_SECS))
            .body(bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            tracing::error!("Picture upload to {} failed ({}): {}", path, status, detail);
            return Err(MatchError::UpstreamUnavailable(format!("media store returned {}", status)));
        }

        tracing::info!("Stored {} bytes at {}/{}", size, self.bucket, path);
        Ok(self.public_url(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_picture_path_layout() {
        let user = Uuid::new_v4();
        let path = picture_path(user, "png");

        assert!(path.starts_with(&format!("profiles/{}-", user)));
        assert!(path.ends_with(".png"));
    }

    #[test]
    fn test_public_url() {
        let storage = SupabaseStorage::new("https://abc.supabase.co/", "anon".to_string(), "profile-pictures");
        assert_eq!(
            storage.public_url("profiles/x.jpg"),
            "https://abc.supabase.co/storage/v1/object/public/profile-pictures/profiles/x.jpg"
        );
    }
}
