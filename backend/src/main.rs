use axum::Router;
use axum::http::{HeaderValue, Method, header};
use shabbat_matches::{AppState, Config, get_db_pool, handlers, utils};
use tower_http::cors::{Any, CorsLayer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    utils::init_logging();

    let config = Config::from_env()?;
    let db_config = shabbat_matches::db::DatabaseConfig::from_env()?;
    let pool = get_db_pool(&db_config).await?;

    // Run migrations
    shabbat_matches::db::migrations::run_migrations(&pool).await?;

    let port = config.port;
    let app = create_app(AppState::from_config(pool, config));

    let listener = tokio::net::TcpListener::bind(&format!("0.0.0.0:{}", port)).await?;
    tracing::info!("Server running on port {}", port);

    axum::serve(listener, app).await?;

    Ok(())
}

fn create_app(state: AppState) -> Router {
    handlers::create_router(state).layer(create_cors_layer())
}

fn create_cors_layer() -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS]);

    // Browsers send the session cookie only to explicitly allowed origins.
    let origins: Vec<HeaderValue> = std::env::var("ALLOWED_ORIGINS")
        .unwrap_or_default()
        .split(',')
        .filter_map(|origin| {
            let trimmed = origin.trim();
            if !trimmed.is_empty() {
                trimmed.parse().ok()
            } else {
                None
            }
        })
        .collect();

    if origins.is_empty() {
        // Default to permissive for development
        tracing::warn!("ALLOWED_ORIGINS not set, allowing any origin without credentials");
        cors.allow_origin(Any).allow_headers(Any)
    } else {
        // Credentialed CORS rejects wildcard headers, so list them.
        cors.allow_origin(origins)
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
    }
}
