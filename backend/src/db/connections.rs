use crate::models::{Connection, ConnectionStatus};
use sqlx::PgPool;
use uuid::Uuid;

/// Every row the user takes part in, either direction, oldest first.
pub async fn get_connections_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Connection>, sqlx::Error> {
    sqlx::query_as::<_, Connection>(
        r#"
        SELECT id, requester_id, target_id, status, created_at, updated_at
        FROM connections
        WHERE requester_id = $1 OR target_id = $1
        ORDER BY created_at ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn get_latest_connection(
    pool: &PgPool,
    requester_id: Uuid,
    target_id: Uuid,
) -> Result<Option<Connection>, sqlx::Error> {
    sqlx::query_as::<_, Connection>(
        r#"
        SELECT id, requester_id, target_id, status, created_at, updated_at
        FROM connections
        WHERE requester_id = $1 AND target_id = $2
        ORDER BY created_at DESC
        LIMIT 1
        "#,
    )
    .bind(requester_id)
    .bind(target_id)
    .fetch_optional(pool)
    .await
}

/// A second pending row for the same pair, in either direction, trips
/// uq_connections_pending_pair.
pub async fn create_connection(
    pool: &PgPool,
    requester_id: Uuid,
    target_id: Uuid,
    status: ConnectionStatus,
) -> Result<Connection, sqlx::Error> {
    sqlx::query_as::<_, Connection>(
        r#"
        INSERT INTO connections (requester_id, target_id, status)
        VALUES ($1, $2, $3)
        RETURNING id, requester_id, target_id, status, created_at, updated_at
        "#,
    )
    .bind(requester_id)
    .bind(target_id)
    .bind(status)
    .fetch_one(pool)
    .await
}

/// Conditional status change. Returns None when the row is no longer in `from`.
pub async fn transition_connection(
    pool: &PgPool,
    connection_id: Uuid,
    from: ConnectionStatus,
    to: ConnectionStatus,
) -> Result<Option<Connection>, sqlx::Error> {
    sqlx::query_as::<_, Connection>(
        r#"
        UPDATE connections
        SET status = $3, updated_at = NOW()
        WHERE id = $1 AND status = $2
        RETURNING id, requester_id, target_id, status, created_at, updated_at
        "#,
    )
    .bind(connection_id)
    .bind(from)
    .bind(to)
    .fetch_optional(pool)
    .await
}
