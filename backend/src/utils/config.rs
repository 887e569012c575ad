use anyhow::Result;
use std::env;
use crate::constants::{DEFAULT_MAX_AGE, DEFAULT_MIN_AGE, DEFAULT_SERVER_PORT, DEFAULT_SITE_URL};
use crate::utils::validation::ProfileRules;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_service_role_key: Option<String>,
    pub site_url: String,
    pub profile_rules: ProfileRules,
}

/// Identity provider settings, usable without a database.
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub url: String,
    pub anon_key: String,
    pub service_role_key: Option<String>,
}

impl SupabaseConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            url: env::var("SUPABASE_URL")
                .map_err(|_| anyhow::anyhow!("SUPABASE_URL must be set"))?
                .trim_end_matches('/')
                .to_string(),
            anon_key: env::var("SUPABASE_ANON_KEY")
                .map_err(|_| anyhow::anyhow!("SUPABASE_ANON_KEY must be set"))?,
            service_role_key: env::var("SUPABASE_SERVICE_ROLE_KEY").ok(),
        })
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let supabase = SupabaseConfig::from_env()?;

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            port: parse_or("PORT", DEFAULT_SERVER_PORT),
            supabase_url: supabase.url,
            supabase_anon_key: supabase.anon_key,
            supabase_service_role_key: supabase.service_role_key,
            site_url: env::var("SITE_URL")
                .unwrap_or_else(|_| DEFAULT_SITE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            profile_rules: profile_rules_from_env()?,
        })
    }
}

/// Age bounds from PROFILE_MIN_AGE / PROFILE_MAX_AGE.
pub fn profile_rules_from_env() -> Result<ProfileRules> {
    let profile_rules = ProfileRules {
        min_age: parse_or("PROFILE_MIN_AGE", DEFAULT_MIN_AGE),
        max_age: parse_or("PROFILE_MAX_AGE", DEFAULT_MAX_AGE),
    };
    if profile_rules.min_age > profile_rules.max_age {
        anyhow::bail!(
            "PROFILE_MIN_AGE ({}) must not exceed PROFILE_MAX_AGE ({})",
            profile_rules.min_age,
            profile_rules.max_age
        );
    }
    Ok(profile_rules)
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid {} value {:?}, using default", key, raw);
            default
        }),
        Err(_) => default,
    }
}
