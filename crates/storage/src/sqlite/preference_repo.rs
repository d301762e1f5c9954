use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;
use sqlx::SqliteConnection;
use sqlx::sqlite::SqliteRow;

use crate::repository::{PreferenceStore, PreferenceValue, StorageError};

use super::SqliteRepository;

fn connection_error(err: sqlx::Error) -> StorageError {
    StorageError::Connection(err.to_string())
}

async fn upsert_preference(
    conn: &mut SqliteConnection,
    key: &str,
    value: &PreferenceValue,
) -> Result<(), StorageError> {
    let (int_value, text_value) = match value {
        PreferenceValue::Int(value) => (Some(*value), None),
        PreferenceValue::Text(value) => (None, Some(value.as_str())),
    };

    sqlx::query(
        r"
        INSERT INTO preferences (key, int_value, text_value, updated_at)
        VALUES (?1, ?2, ?3, ?4)
        ON CONFLICT(key) DO UPDATE SET
            int_value = excluded.int_value,
            text_value = excluded.text_value,
            updated_at = excluded.updated_at
        ",
    )
    .bind(key)
    .bind(int_value)
    .bind(text_value)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await
    .map_err(connection_error)?;

    Ok(())
}

impl SqliteRepository {
    async fn fetch_preference(&self, key: &str) -> Result<Option<SqliteRow>, StorageError> {
        sqlx::query(
            r"
            SELECT int_value, text_value
            FROM preferences
            WHERE key = ?1
            ",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(connection_error)
    }

    async fn store_one(&self, key: &str, value: &PreferenceValue) -> Result<(), StorageError> {
        let mut conn = self.pool.acquire().await.map_err(connection_error)?;
        upsert_preference(&mut *conn, key, value).await
    }
}

#[async_trait]
impl PreferenceStore for SqliteRepository {
    async fn get_int(&self, key: &str) -> Result<Option<i64>, StorageError> {
        let Some(row) = self.fetch_preference(key).await? else {
            return Ok(None);
        };

        let value: Option<i64> = row
            .try_get("int_value")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        value
            .map(Some)
            .ok_or_else(|| StorageError::Serialization(format!("{key} is not an integer")))
    }

    async fn set_int(&self, key: &str, value: i64) -> Result<(), StorageError> {
        self.store_one(key, &PreferenceValue::Int(value)).await
    }

    async fn get_string(&self, key: &str) -> Result<Option<String>, StorageError> {
        let Some(row) = self.fetch_preference(key).await? else {
            return Ok(None);
        };

        let value: Option<String> = row
            .try_get("text_value")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        value
            .map(Some)
            .ok_or_else(|| StorageError::Serialization(format!("{key} is not a string")))
    }

    async fn set_string(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.store_one(key, &PreferenceValue::text(value)).await
    }

    async fn set_many(&self, entries: &[(&str, PreferenceValue)]) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(connection_error)?;

        for (key, value) in entries {
            upsert_preference(&mut *tx, key, value).await?;
        }

        // Dropping `tx` on an early return rolls the whole batch back.
        tx.commit().await.map_err(connection_error)?;
        Ok(())
    }
}
