use chrono::{DateTime, Utc};
use quiz_core::model::{SessionState, TargetWord};
use sqlx::Row;

use crate::repository::{SessionRecord, StorageError};

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn revision_to_i64(v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization("revision overflow".into()))
}

pub(crate) fn revision_from_i64(v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid revision: {v}")))
}

pub(crate) fn map_session_row(row: &sqlx::sqlite::SqliteRow) -> Result<SessionRecord, StorageError> {
    let mut targets = Vec::with_capacity(3);
    for column in ["target_0", "target_1", "target_2"] {
        let word: String = row.try_get(column).map_err(ser)?;
        targets.push(TargetWord::new(word).map_err(ser)?);
    }

    let state = SessionState::from_persisted(
        targets,
        u32_from_i64(
            "current_target_index",
            row.try_get("current_target_index").map_err(ser)?,
        )?,
        u32_from_i64(
            "current_hint_index",
            row.try_get("current_hint_index").map_err(ser)?,
        )?,
        u32_from_i64("trial", row.try_get("trial").map_err(ser)?)?,
        u32_from_i64("score", row.try_get("score").map_err(ser)?)?,
        row.try_get::<bool, _>("ended").map_err(ser)?,
    )
    .map_err(ser)?;

    let revision = revision_from_i64(row.try_get("revision").map_err(ser)?)?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(ser)?;

    Ok(SessionRecord {
        state,
        revision,
        updated_at,
    })
}
