use async_trait::async_trait;
use ecopay_core::domain::credits::UserCredits;
use ecopay_core::domain::message::ChatMessage;
use ecopay_core::errors::ApplicationError;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::warn;

pub mod memory;
pub mod sqlite;

pub use memory::InMemoryConversationStore;
pub use sqlite::SqlConversationStore;

pub const MESSAGES_KEY: &str = "ecopay-chat-messages";
pub const CREDITS_KEY: &str = "ecopay-credits";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

impl From<StoreError> for ApplicationError {
    fn from(value: StoreError) -> Self {
        ApplicationError::Persistence(value.to_string())
    }
}

/// Storage for the two independently keyed conversation records.
///
/// Loads return `Ok(None)` both when a record is absent and when it cannot be
/// decoded; callers substitute their defaults in either case.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn load_messages(&self) -> Result<Option<Vec<ChatMessage>>, StoreError>;
    async fn save_messages(&self, messages: &[ChatMessage]) -> Result<(), StoreError>;
    async fn load_credits(&self) -> Result<Option<UserCredits>, StoreError>;
    async fn save_credits(&self, credits: &UserCredits) -> Result<(), StoreError>;
    async fn clear(&self) -> Result<(), StoreError>;
}

pub(crate) fn decode_record<T>(key: &str, raw: Option<String>) -> Option<T>
where
    T: DeserializeOwned,
{
    let raw = raw?;
    match serde_json::from_str::<T>(&raw) {
        Ok(value) => Some(value),
        Err(error) => {
            warn!(
                event_name = "db.store.decode_failed",
                key,
                error = %error,
                "stored record is malformed; falling back to defaults"
            );
            None
        }
    }
}
