pub mod models;
pub mod db;
pub mod engine;
pub mod services;
pub mod handlers;
pub mod utils;
pub mod constants;
pub mod error;
pub mod state;

pub use utils::config::Config;
pub use db::connection::get_db_pool;
pub use engine::MatchEngine;
pub use error::{MatchError, MatchResult};
pub use state::AppState;

// Re-export common types
pub use sqlx::PgPool;
pub use anyhow::Result;
pub use uuid::Uuid;
pub use chrono::{DateTime, Utc};
