use async_trait::async_trait;
use chrono::Utc;
use qbank_core::model::{ProgressKind, QuestionId, Theme};
use sqlx::Row;
use std::collections::HashSet;

use super::SqliteRepository;
use crate::repository::{
    ProgressRepository, StorageError, StoreKey, decode_id_set, encode_id_set, parse_theme,
};

impl SqliteRepository {
    async fn get_value(&self, key: StoreKey) -> Result<Option<String>, StorageError> {
        let row = sqlx::query("SELECT value FROM kv_store WHERE key = ?1")
            .bind(key.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        row.try_get::<String, _>("value")
            .map(Some)
            .map_err(|err| StorageError::Serialization(err.to_string()))
    }

    async fn put_value(&self, key: StoreKey, value: &str) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            ",
        )
        .bind(key.as_str())
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl ProgressRepository for SqliteRepository {
    async fn load_ids(&self, kind: ProgressKind) -> Result<HashSet<QuestionId>, StorageError> {
        match self.get_value(kind.into()).await? {
            Some(raw) => decode_id_set(&raw),
            None => Ok(HashSet::new()),
        }
    }

    async fn save_ids(
        &self,
        kind: ProgressKind,
        ids: &HashSet<QuestionId>,
    ) -> Result<(), StorageError> {
        let encoded = encode_id_set(ids)?;
        self.put_value(kind.into(), &encoded).await
    }

    async fn load_theme(&self) -> Result<Option<Theme>, StorageError> {
        self.get_value(StoreKey::Theme)
            .await?
            .map(|raw| parse_theme(&raw))
            .transpose()
    }

    async fn save_theme(&self, theme: Theme) -> Result<(), StorageError> {
        self.put_value(StoreKey::Theme, theme.as_str()).await
    }
}
