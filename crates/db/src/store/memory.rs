use std::collections::HashMap;

use ecopay_core::domain::credits::UserCredits;
use ecopay_core::domain::message::ChatMessage;
use tokio::sync::RwLock;

use super::{decode_record, ConversationStore, StoreError, CREDITS_KEY, MESSAGES_KEY};

/// Process-local store. Values are kept serialized so decoding behaves the
/// same as the SQLite backend.
#[derive(Default)]
pub struct InMemoryConversationStore {
    records: RwLock<HashMap<String, String>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_raw(&self, key: &str, value: impl Into<String>) {
        let mut records = self.records.write().await;
        records.insert(key.to_string(), value.into());
    }

    pub async fn raw(&self, key: &str) -> Option<String> {
        let records = self.records.read().await;
        records.get(key).cloned()
    }

    async fn put(&self, key: &str, value: String) {
        let mut records = self.records.write().await;
        records.insert(key.to_string(), value);
    }
}

#[async_trait::async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn load_messages(&self) -> Result<Option<Vec<ChatMessage>>, StoreError> {
        Ok(decode_record(MESSAGES_KEY, self.raw(MESSAGES_KEY).await))
    }

    async fn save_messages(&self, messages: &[ChatMessage]) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(messages)?;
        self.put(MESSAGES_KEY, encoded).await;
        Ok(())
    }

    async fn load_credits(&self) -> Result<Option<UserCredits>, StoreError> {
        Ok(decode_record(CREDITS_KEY, self.raw(CREDITS_KEY).await))
    }

    async fn save_credits(&self, credits: &UserCredits) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(credits)?;
        self.put(CREDITS_KEY, encoded).await;
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        records.remove(MESSAGES_KEY);
        records.remove(CREDITS_KEY);
        Ok(())
    }
}
