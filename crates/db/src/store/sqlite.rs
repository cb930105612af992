use chrono::Utc;
use ecopay_core::domain::credits::UserCredits;
use ecopay_core::domain::message::ChatMessage;
use sqlx::Row;

use super::{decode_record, ConversationStore, StoreError, CREDITS_KEY, MESSAGES_KEY};
use crate::DbPool;

pub struct SqlConversationStore {
    pool: DbPool,
}

impl SqlConversationStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let row = sqlx::query("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| row.try_get::<String, _>("value")).transpose().map_err(StoreError::from)
    }

    async fn put(&self, key: &str, value: String) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl ConversationStore for SqlConversationStore {
    async fn load_messages(&self) -> Result<Option<Vec<ChatMessage>>, StoreError> {
        Ok(decode_record(MESSAGES_KEY, self.get(MESSAGES_KEY).await?))
    }

    async fn save_messages(&self, messages: &[ChatMessage]) -> Result<(), StoreError> {
        self.put(MESSAGES_KEY, serde_json::to_string(messages)?).await
    }

    async fn load_credits(&self) -> Result<Option<UserCredits>, StoreError> {
        Ok(decode_record(CREDITS_KEY, self.get(CREDITS_KEY).await?))
    }

    async fn save_credits(&self, credits: &UserCredits) -> Result<(), StoreError> {
        self.put(CREDITS_KEY, serde_json::to_string(credits)?).await
    }

    async fn clear(&self) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM kv_store WHERE key IN (?, ?)")
            .bind(MESSAGES_KEY)
            .bind(CREDITS_KEY)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
