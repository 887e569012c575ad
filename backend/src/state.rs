use std::sync::Arc;

use sqlx::PgPool;

use crate::constants::PROFILE_PICTURE_BUCKET;
use crate::db::PgStore;
use crate::engine::MatchEngine;
use crate::services::{IdentityProvider, MediaStore, SupabaseAuth, SupabaseStorage};
use crate::utils::Config;

#[derive(Clone)]
pub struct AppState {
    pub engine: MatchEngine,
    pub identity: Arc<dyn IdentityProvider>,
    pub media: Arc<dyn MediaStore>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(
        engine: MatchEngine,
        identity: Arc<dyn IdentityProvider>,
        media: Arc<dyn MediaStore>,
        config: Config,
    ) -> Self {
        Self {
            engine,
            identity,
            media,
            config: Arc::new(config),
        }
    }

    /// Production wiring: Postgres store plus the Supabase auth and storage APIs.
    pub fn from_config(pool: PgPool, config: Config) -> Self {
        let engine = MatchEngine::new(Arc::new(PgStore::new(pool)), config.profile_rules);
        let identity = SupabaseAuth::new(&config.supabase_url, config.supabase_anon_key.clone());
        let media = SupabaseStorage::new(
            &config.supabase_url,
            config.supabase_anon_key.clone(),
            PROFILE_PICTURE_BUCKET,
        );

        Self::new(engine, Arc::new(identity), Arc::new(media), config)
    }
}
