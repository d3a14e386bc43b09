use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

/// Runs the schema migrations that have not been applied yet.
///
/// Version 1 creates the per-player session table and the hint image table.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    if !is_applied(pool, 1).await? {
        tracing::info!(version = 1, "applying quiz schema migration");
        let mut tx = pool.begin().await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS quiz_sessions (
                    player_id TEXT PRIMARY KEY,
                    target_0 TEXT NOT NULL,
                    target_1 TEXT NOT NULL,
                    target_2 TEXT NOT NULL,
                    current_target_index INTEGER NOT NULL CHECK (current_target_index BETWEEN 0 AND 2),
                    current_hint_index INTEGER NOT NULL CHECK (current_hint_index BETWEEN 0 AND 2),
                    trial INTEGER NOT NULL CHECK (trial BETWEEN 0 AND 3),
                    score INTEGER NOT NULL CHECK (score >= 0),
                    ended INTEGER NOT NULL DEFAULT 0,
                    revision INTEGER NOT NULL CHECK (revision >= 1),
                    updated_at TEXT NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS hint_images (
                    target TEXT NOT NULL,
                    position INTEGER NOT NULL CHECK (position BETWEEN 0 AND 2),
                    image TEXT NOT NULL,
                    PRIMARY KEY (target, position)
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                INSERT INTO schema_migrations (version, applied_at)
                VALUES (?1, ?2)
                ON CONFLICT(version) DO NOTHING
            ",
        )
        .bind(1_i64)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
    }

    Ok(())
}
