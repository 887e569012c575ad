use anyhow::Result;
use clap::Parser;
use serde_json::json;
use shabbat_matches::{
    MatchError,
    db::{DatabaseConfig, MatchStore, PgStore, get_db_pool, profiles},
    models::{Gender, GenderPreference, ProfileDraft},
    services::{IdentityProvider, SupabaseAuth},
    utils::{config::profile_rules_from_env, init_logging, validation::normalize_phone, SupabaseConfig},
};
use tracing::{info, warn};

/// Create a confirmed test account through the identity provider's admin API,
/// optionally with a profile.
#[derive(Debug, Parser)]
#[command(name = "seed_user")]
struct Args {
    #[arg(long, default_value = "test@test.com")]
    email: String,

    #[arg(long, default_value = "ASdasd123")]
    password: String,

    /// Also create or update a profile for the account
    #[arg(long)]
    name: Option<String>,

    #[arg(long, default_value_t = 30)]
    age: i32,

    #[arg(long, value_parser = parse_gender, default_value = "female")]
    gender: Gender,

    #[arg(long, value_parser = parse_preference, default_value = "male")]
    preferred: GenderPreference,

    #[arg(long)]
    phone: Option<String>,

    /// Grant the admin flag on the profile
    #[arg(long)]
    admin: bool,
}

fn parse_gender(raw: &str) -> Result<Gender, String> {
    serde_json::from_value(json!(raw)).map_err(|_| format!("unknown gender: {}", raw))
}

fn parse_preference(raw: &str) -> Result<GenderPreference, String> {
    serde_json::from_value(json!(raw)).map_err(|_| format!("unknown preference: {}", raw))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    // The database is only needed when a profile is requested.
    let supabase = SupabaseConfig::from_env()?;
    let service_role_key = supabase
        .service_role_key
        .clone()
        .ok_or_else(|| anyhow::anyhow!("SUPABASE_SERVICE_ROLE_KEY must be set"))?;
    let auth = SupabaseAuth::new(&supabase.url, supabase.anon_key.clone());

    let identity = match auth
        .create_confirmed_user(&service_role_key, &args.email, &args.password, json!({ "is_test_user": true }))
        .await
    {
        Ok(identity) => {
            info!("Created user {} ({})", args.email, identity.id);
            identity
        }
        // If user already exists, that's fine
        Err(MatchError::Conflict(_)) => {
            warn!("User {} already exists, signing in to resolve the id", args.email);
            auth.sign_in(&args.email, &args.password).await?.user
        }
        Err(e) => return Err(e.into()),
    };

    let Some(name) = args.name else {
        return Ok(());
    };

    let draft = profile_rules_from_env()?.check_draft(ProfileDraft {
        name,
        age: args.age,
        gender: args.gender,
        preferred_genders: args.preferred,
        bio: String::new(),
        profile_pic_url: None,
    })?;
    let phone = normalize_phone(args.phone.as_deref())?;

    let db_config = DatabaseConfig::from_env()?;
    let pool = get_db_pool(&db_config).await?;
    let store = PgStore::new(pool);

    let profile = store.upsert_profile(identity.id, &draft).await?;
    info!("Profile {} ready for {}", profile.id, identity.id);

    if let Some(phone) = phone {
        store.update_phone(identity.id, Some(&phone)).await?;
    }
    if args.admin {
        profiles::set_admin(store.pool(), identity.id, true).await?;
        info!("Granted admin to {}", identity.id);
    }

    Ok(())
}
