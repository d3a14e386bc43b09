use chrono::{DateTime, Utc};
use quiz_core::model::{PlayerId, SessionState};

use super::SqliteRepository;
use super::mapping::{conn, map_session_row, revision_from_i64, revision_to_i64};
use crate::repository::{SessionRecord, SessionRepository, StorageError};

#[async_trait::async_trait]
impl SessionRepository for SqliteRepository {
    async fn get_session(&self, player: &PlayerId) -> Result<SessionRecord, StorageError> {
        let row = sqlx::query(
            r"
                SELECT
                    target_0, target_1, target_2,
                    current_target_index, current_hint_index, trial, score, ended,
                    revision, updated_at
                FROM quiz_sessions
                WHERE player_id = ?1
            ",
        )
        .bind(player.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?
        .ok_or(StorageError::NotFound)?;

        map_session_row(&row)
    }

    async fn put_session(
        &self,
        player: &PlayerId,
        state: &SessionState,
        at: DateTime<Utc>,
    ) -> Result<u64, StorageError> {
        let [t0, t1, t2] = state.targets();
        let revision: i64 = sqlx::query_scalar(
            r"
                INSERT INTO quiz_sessions (
                    player_id, target_0, target_1, target_2,
                    current_target_index, current_hint_index, trial, score, ended,
                    revision, updated_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 1, ?10)
                ON CONFLICT(player_id) DO UPDATE SET
                    target_0 = excluded.target_0,
                    target_1 = excluded.target_1,
                    target_2 = excluded.target_2,
                    current_target_index = excluded.current_target_index,
                    current_hint_index = excluded.current_hint_index,
                    trial = excluded.trial,
                    score = excluded.score,
                    ended = excluded.ended,
                    revision = quiz_sessions.revision + 1,
                    updated_at = excluded.updated_at
                RETURNING revision
            ",
        )
        .bind(player.as_str())
        .bind(t0.as_str())
        .bind(t1.as_str())
        .bind(t2.as_str())
        .bind(i64::from(state.current_target_index()))
        .bind(i64::from(state.current_hint_index()))
        .bind(i64::from(state.trial()))
        .bind(i64::from(state.score()))
        .bind(state.is_ended())
        .bind(at)
        .fetch_one(&self.pool)
        .await
        .map_err(conn)?;

        tracing::debug!(player = %player, revision, "session stored");
        revision_from_i64(revision)
    }

    async fn replace_session(
        &self,
        player: &PlayerId,
        expected: u64,
        state: &SessionState,
        at: DateTime<Utc>,
    ) -> Result<u64, StorageError> {
        let expected_i64 = revision_to_i64(expected)?;
        let res = sqlx::query(
            r"
                UPDATE quiz_sessions SET
                    current_target_index = ?1,
                    current_hint_index = ?2,
                    trial = ?3,
                    score = ?4,
                    ended = ?5,
                    revision = revision + 1,
                    updated_at = ?6
                WHERE player_id = ?7 AND revision = ?8
            ",
        )
        .bind(i64::from(state.current_target_index()))
        .bind(i64::from(state.current_hint_index()))
        .bind(i64::from(state.trial()))
        .bind(i64::from(state.score()))
        .bind(state.is_ended())
        .bind(at)
        .bind(player.as_str())
        .bind(expected_i64)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        if res.rows_affected() == 1 {
            return Ok(expected + 1);
        }

        let actual: Option<i64> =
            sqlx::query_scalar("SELECT revision FROM quiz_sessions WHERE player_id = ?1")
                .bind(player.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(conn)?;

        match actual {
            None => Err(StorageError::NotFound),
            Some(actual) => Err(StorageError::Conflict {
                expected,
                actual: revision_from_i64(actual)?,
            }),
        }
    }
}
