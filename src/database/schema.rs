//! Idempotent table setup for the PostgreSQL store.

use sqlx::PgPool;
use tracing::info;

use super::manager::DatabaseError;

pub const STATEMENTS: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS habits (
        id VARCHAR(500) PRIMARY KEY,
        name VARCHAR(100) NOT NULL,
        description TEXT NULL,
        "type" INTEGER NOT NULL,
        frequency_type INTEGER NOT NULL,
        frequency_times_per_period INTEGER NOT NULL,
        target_value INTEGER NOT NULL,
        target_unit VARCHAR(100) NOT NULL,
        status INTEGER NOT NULL,
        is_archived BOOLEAN NOT NULL DEFAULT FALSE,
        end_date DATE NULL,
        milestone_target INTEGER NULL,
        milestone_current INTEGER NULL,
        created_at_utc TIMESTAMPTZ NOT NULL,
        updated_at_utc TIMESTAMPTZ NULL,
        last_completed_at_utc TIMESTAMPTZ NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS tags (
        id VARCHAR(500) PRIMARY KEY,
        name VARCHAR(50) NOT NULL,
        description VARCHAR(500) NULL,
        created_at_utc TIMESTAMPTZ NOT NULL,
        updated_at_utc TIMESTAMPTZ NULL
    )"#,
    r#"CREATE UNIQUE INDEX IF NOT EXISTS ix_tags_name ON tags (name)"#,
    r#"CREATE TABLE IF NOT EXISTS habit_tags (
        habit_id VARCHAR(500) NOT NULL REFERENCES habits (id) ON DELETE CASCADE,
        tag_id VARCHAR(500) NOT NULL REFERENCES tags (id) ON DELETE CASCADE,
        created_at_utc TIMESTAMPTZ NOT NULL,
        PRIMARY KEY (habit_id, tag_id)
    )"#,
];

pub async fn apply(pool: &PgPool) -> Result<(), DatabaseError> {
    for statement in STATEMENTS {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| DatabaseError::MigrationError(e.to_string()))?;
    }
    info!("Database schema ready ({} statements)", STATEMENTS.len());
    Ok(())
}
