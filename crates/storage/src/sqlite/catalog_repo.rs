use std::collections::BTreeMap;

use quiz_core::model::{HINTS_PER_TARGET, HintCatalog, HintImage, TargetWord};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conn, ser};
use crate::repository::{CatalogRepository, StorageError};

#[async_trait::async_trait]
impl CatalogRepository for SqliteRepository {
    async fn load_catalog(&self) -> Result<HintCatalog, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT target, image
                FROM hint_images
                ORDER BY target ASC, position ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for row in rows {
            let target: String = row.try_get("target").map_err(ser)?;
            let image: String = row.try_get("image").map_err(ser)?;
            groups.entry(target).or_default().push(image);
        }

        HintCatalog::from_groups(groups).map_err(ser)
    }

    async fn upsert_target(
        &self,
        target: &TargetWord,
        hints: &[HintImage],
    ) -> Result<(), StorageError> {
        if hints.len() != HINTS_PER_TARGET {
            return Err(StorageError::Serialization(format!(
                "target {target:?} needs {HINTS_PER_TARGET} hints, got {}",
                hints.len()
            )));
        }

        let mut tx = self.pool.begin().await.map_err(conn)?;

        sqlx::query("DELETE FROM hint_images WHERE target = ?1")
            .bind(target.as_str())
            .execute(&mut *tx)
            .await
            .map_err(conn)?;

        for (position, hint) in hints.iter().enumerate() {
            let position = i64::try_from(position).map_err(ser)?;
            sqlx::query(
                r"
                    INSERT INTO hint_images (target, position, image)
                    VALUES (?1, ?2, ?3)
                ",
            )
            .bind(target.as_str())
            .bind(position)
            .bind(hint.as_str())
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        }

        tx.commit().await.map_err(conn)?;
        Ok(())
    }
}
